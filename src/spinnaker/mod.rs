//! Spinnaker side: webhook payload model, event type decoding, dispatch

pub mod dispatcher;
pub mod event_type;
pub mod webhook;

pub use dispatcher::{DispatchResult, Dispatcher, Handler};
pub use event_type::{classify, ClassifiedEvent, MalformedEventType};
pub use webhook::{Authentication, Content, Details, Execution, IncomingWebhook, Timestamp, Trigger};
