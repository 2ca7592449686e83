//! Datadog event handler
//!
//! Turns one Spinnaker webhook into one Datadog event and, for finished
//! pipelines, one `pipeline.duration` timing. Steps run strictly in order:
//!
//! classify -> compile -> title -> text -> tags -> post event -> timing
//!
//! Any failure up to and including the event post aborts the call and nothing
//! further is sent. The timing is best effort: its failure is logged and
//! reported in [`HandleReport`] but the call still succeeds.

use anyhow::Result;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info, warn};

use super::client::{EventPoster, TimingEmitter};
use super::event::{base_tags, AlertSeverity, OutboundEvent};
use super::metrics::{derive_timing, SkipReason, TimingSample};
use crate::error::HandleError;
use crate::spinnaker::{classify, Handler, IncomingWebhook};
use crate::template::{CompileError, CompiledEventTemplate, EventTemplate, TemplateField};

/// What happened to the timing metric of one webhook
#[derive(Debug, Clone, PartialEq)]
pub enum MetricOutcome {
    Emitted(TimingSample),
    Skipped(SkipReason),
    Failed { sample: TimingSample, error: String },
}

/// Result of a successfully handled webhook
#[derive(Debug, Clone, PartialEq)]
pub struct HandleReport {
    pub event: OutboundEvent,
    pub metric: MetricOutcome,
}

pub struct DatadogEventHandler {
    name: String,
    template: RwLock<EventTemplate>,
    /// Compiled form together with the template value it came from
    compiled: Mutex<Option<(EventTemplate, Arc<CompiledEventTemplate>)>>,
    poster: Arc<dyn EventPoster>,
    emitter: Arc<dyn TimingEmitter>,
}

impl DatadogEventHandler {
    pub fn new(
        name: impl Into<String>,
        template: EventTemplate,
        poster: Arc<dyn EventPoster>,
        emitter: Arc<dyn TimingEmitter>,
    ) -> Self {
        Self {
            name: name.into(),
            template: RwLock::new(template),
            compiled: Mutex::new(None),
            poster,
            emitter,
        }
    }

    pub fn template(&self) -> EventTemplate {
        self.template
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap the template; the next webhook is rendered with the new one
    pub fn replace_template(&self, template: EventTemplate) {
        *self.template.write().unwrap_or_else(PoisonError::into_inner) = template;
    }

    /// Compiled form of the current template.
    ///
    /// Reused only while the template value is unchanged. A template that
    /// fails to compile is never cached, so it fails on every call.
    fn compiled_template(&self) -> Result<Arc<CompiledEventTemplate>, CompileError> {
        let template = self.template();
        let mut cache = self.compiled.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some((source, compiled)) = cache.as_ref() {
            if *source == template {
                return Ok(Arc::clone(compiled));
            }
        }

        *cache = None;
        let compiled = Arc::new(template.compile()?);
        debug!(handler = %self.name, tags = compiled.tag_count(), "Compiled event template");
        *cache = Some((template, Arc::clone(&compiled)));
        Ok(compiled)
    }

    /// Handle one webhook
    pub fn process(&self, incoming: &IncomingWebhook) -> Result<HandleReport, HandleError> {
        let classified = classify(&incoming.details.event_type)?;
        let compiled = self.compiled_template()?;

        let title = compiled.execute(TemplateField::Title, incoming)?;
        let text = compiled.execute(TemplateField::Text, incoming)?;

        let mut tags = base_tags(incoming, &classified);
        tags.extend(compiled.render_tags(incoming)?);

        let event = OutboundEvent {
            title,
            text,
            tags,
            aggregation_key: incoming.content.execution_id.clone(),
            alert_severity: AlertSeverity::for_event(&classified),
        };
        let timing = derive_timing(&classified, incoming, &event.tags);

        self.poster
            .post_event(&event)
            .map_err(HandleError::BackendPost)?;
        info!(
            handler = %self.name,
            event_type = %incoming.details.event_type,
            aggregation_key = %event.aggregation_key,
            "Posted Datadog event"
        );

        let metric = match timing {
            Err(reason) => {
                debug!(handler = %self.name, reason = %reason, "No timing metric");
                MetricOutcome::Skipped(reason)
            }
            Ok(sample) => match self.emitter.emit_timing(
                &sample.name,
                sample.duration_millis,
                &sample.tags,
                sample.sample_rate,
            ) {
                Ok(()) => {
                    debug!(handler = %self.name, metric = %sample.name, duration_ms = sample.duration_millis, "Emitted timing");
                    MetricOutcome::Emitted(sample)
                }
                Err(e) => {
                    warn!(handler = %self.name, metric = %sample.name, error = %e, "Failed to emit timing metric");
                    MetricOutcome::Failed {
                        sample,
                        error: e.to_string(),
                    }
                }
            },
        };

        Ok(HandleReport { event, metric })
    }
}

impl Handler for DatadogEventHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, incoming: &IncomingWebhook) -> Result<()> {
        self.process(incoming)?;
        Ok(())
    }
}
