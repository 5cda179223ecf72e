//! Error types for browser driver operations.

use thiserror::Error;

/// Failures a driver implementation may report for a single primitive.
#[derive(Debug, Error, Clone)]
pub enum DriverError {
    /// No element matched the selector.
    #[error("element not found: {0}")]
    NotFound(String),

    /// The element exists but cannot be interacted with (obscured, disabled).
    #[error("element not interactable: {0}")]
    NotInteractable(String),

    /// The execution context went away mid-call, usually because the page
    /// navigated. Callers treat this as evidence of a state transition, not
    /// as a hard failure.
    #[error("execution context lost: {0}")]
    ContextLost(String),

    /// Script evaluation raised inside the page.
    #[error("script evaluation failed: {0}")]
    Evaluation(String),

    /// Transport-level failure talking to the browser.
    #[error("driver I/O error: {0}")]
    Io(String),
}

impl DriverError {
    /// True when the failure means the page context was torn down mid-call.
    pub fn is_context_lost(&self) -> bool {
        matches!(self, DriverError::ContextLost(_))
    }
}
