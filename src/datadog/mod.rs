//! Datadog side: outbound events, timing policy, backend clients, handlers
//!
//! # Example
//! ```ignore
//! use spinnaker_datadog_bridge::datadog::{DryRunBackend, Spout};
//! use spinnaker_datadog_bridge::spinnaker::Dispatcher;
//!
//! let backend = Arc::new(DryRunBackend::new());
//! let spout = Spout::from_template_file(backend.clone(), backend, Path::new("templates.json"))?;
//! let mut dispatcher = Dispatcher::new();
//! spout.attach_to_dispatcher(&mut dispatcher);
//! dispatcher.dispatch(&webhook);
//! ```

pub mod client;
pub mod dry_run;
pub mod event;
pub mod handler;
pub mod metrics;
pub mod spout;
pub mod statsd;

pub use client::{DatadogClient, EventPoster, TimingEmitter};
pub use dry_run::DryRunBackend;
pub use event::{base_tags, AlertSeverity, OutboundEvent, ORIGIN_TAG};
pub use handler::{DatadogEventHandler, HandleReport, MetricOutcome};
pub use metrics::{derive_timing, SkipReason, TimingSample, PIPELINE_DURATION_METRIC};
pub use spout::{load_templates, Spout, TemplateFileError, TemplateFormatError, TemplateRecord};
pub use statsd::DogStatsdClient;
