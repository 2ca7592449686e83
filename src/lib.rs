//! Spinnaker -> Datadog bridge
//!
//! Turns Spinnaker pipeline and stage lifecycle webhooks into Datadog events
//! and `pipeline.duration` timing metrics.

pub mod config;
pub mod datadog;
pub mod error;
pub mod spinnaker;
pub mod template;

pub use config::{BridgeConfig, ConfigError, DatadogConfig, StatsdConfig};
pub use datadog::{
    AlertSeverity, DatadogClient, DatadogEventHandler, DogStatsdClient, DryRunBackend, EventPoster,
    HandleReport, MetricOutcome, OutboundEvent, Spout, TimingEmitter, TimingSample,
};
pub use error::{BackendError, HandleError};
pub use spinnaker::{classify, ClassifiedEvent, DispatchResult, Dispatcher, Handler, IncomingWebhook};
pub use template::{CompiledEventTemplate, EventTemplate, TemplateError, TemplateField};
