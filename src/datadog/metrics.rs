//! Pipeline duration metric policy
//!
//! Only finished pipeline executions produce a `pipeline.duration` timing.
//! Stage events and `starting` events never do. Durations are passed through
//! as computed, including zero and negative values from unset timestamps.

use serde::Serialize;

use crate::spinnaker::{ClassifiedEvent, IncomingWebhook};

pub const PIPELINE_DURATION_METRIC: &str = "pipeline.duration";

/// Timings are always submitted unsampled
pub const DEFAULT_SAMPLE_RATE: f64 = 1.0;

/// One timing sample to submit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingSample {
    pub name: String,
    pub duration_millis: i64,
    pub tags: Vec<String>,
    pub sample_rate: f64,
}

/// Why no timing was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotPipeline,
    PipelineStarting,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NotPipeline => write!(f, "not a pipeline event"),
            SkipReason::PipelineStarting => write!(f, "pipeline is starting"),
        }
    }
}

/// Decide whether the webhook yields a `pipeline.duration` sample.
///
/// `event_tags` are the tags of the outbound event; the sample carries them
/// followed by `execution_id`, `triggered_by` and `pipeline_name`.
pub fn derive_timing(
    classified: &ClassifiedEvent,
    incoming: &IncomingWebhook,
    event_tags: &[String],
) -> Result<TimingSample, SkipReason> {
    if !classified.is_pipeline() {
        return Err(SkipReason::NotPipeline);
    }
    if classified.is_starting() {
        return Err(SkipReason::PipelineStarting);
    }

    let mut tags = event_tags.to_vec();
    tags.push(format!("execution_id:{}", incoming.content.execution_id));
    tags.push(format!("triggered_by:{}", incoming.triggered_by()));
    tags.push(format!("pipeline_name:{}", incoming.pipeline_name()));

    Ok(TimingSample {
        name: PIPELINE_DURATION_METRIC.to_string(),
        duration_millis: incoming.execution_duration_millis(),
        tags,
        sample_rate: DEFAULT_SAMPLE_RATE,
    })
}
