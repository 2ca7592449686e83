//! Error types for webhook handling and backend submission
//!
//! Every [`HandleError`] aborts the handling of one webhook before anything is
//! sent, except [`HandleError::BackendPost`] which is the event submission
//! itself failing. Timing-metric failures are not errors of the handler; they
//! surface as [`crate::datadog::MetricOutcome::Failed`].

use thiserror::Error;

use crate::spinnaker::MalformedEventType;
use crate::template::{CompileError, RenderError};

/// Failure talking to the monitoring backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Datadog API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal errors of a single webhook invocation
#[derive(Debug, Error)]
pub enum HandleError {
    #[error(transparent)]
    MalformedEventType(#[from] MalformedEventType),

    #[error(transparent)]
    TemplateCompile(#[from] CompileError),

    #[error(transparent)]
    TemplateExecution(#[from] RenderError),

    #[error("could not post event to Datadog: {0}")]
    BackendPost(#[source] BackendError),
}
