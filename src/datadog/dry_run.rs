//! Dry-run backend - prints what would be sent instead of sending it

use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

use super::client::{EventPoster, TimingEmitter};
use super::event::OutboundEvent;
use super::statsd::format_timing;
use crate::error::BackendError;

#[derive(Debug, Default)]
pub struct DryRunBackend {
    events: AtomicUsize,
    timings: AtomicUsize,
}

impl DryRunBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_count(&self) -> usize {
        self.events.load(Ordering::SeqCst)
    }

    pub fn timing_count(&self) -> usize {
        self.timings.load(Ordering::SeqCst)
    }
}

impl EventPoster for DryRunBackend {
    fn post_event(&self, event: &OutboundEvent) -> Result<(), BackendError> {
        self.events.fetch_add(1, Ordering::SeqCst);
        info!(title = %event.title, aggregation_key = %event.aggregation_key, "Dry-run event");
        let body = serde_json::to_string(event).unwrap_or_else(|_| format!("{:?}", event));
        eprintln!("[DRY-RUN] Would post event: {}", body);
        Ok(())
    }
}

impl TimingEmitter for DryRunBackend {
    fn emit_timing(
        &self,
        name: &str,
        duration_millis: i64,
        tags: &[String],
        sample_rate: f64,
    ) -> Result<(), BackendError> {
        self.timings.fetch_add(1, Ordering::SeqCst);
        eprintln!(
            "[DRY-RUN] Would emit timing: {}",
            format_timing(name, duration_millis, tags, sample_rate)
        );
        Ok(())
    }
}
