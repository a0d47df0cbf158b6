//! Flow-level error taxonomy.
//!
//! Fatal-to-step failures come back as [`FlowError`]: the step re-renders
//! with the message and the user may retry. Best-effort failures never
//! block advancing; they aggregate as [`FlowWarning`]s on the returned
//! [`StepAdvance`] and surface as dismissible notices.

use hirelane_core::error::CoreError;

use crate::transport::TransportError;

/// A failure that blocks advancing past the current step.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("No phone number on file for this flow")]
    MissingPhone,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Skip is not available on this step")]
    SkipUnavailable,
}

pub type FlowResult<T> = Result<T, FlowError>;

/// A best-effort operation that failed without blocking progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowWarning {
    /// Which operation failed, e.g. `"home_location"`.
    pub operation: &'static str,
    pub message: String,
}

impl FlowWarning {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Outcome of a successful step submission.
#[derive(Debug)]
pub struct StepAdvance<S> {
    /// The step the flow landed on.
    pub step: S,
    /// Best-effort failures collected along the way.
    pub warnings: Vec<FlowWarning>,
}

impl<S> StepAdvance<S> {
    pub fn clean(step: S) -> Self {
        Self {
            step,
            warnings: Vec::new(),
        }
    }
}
