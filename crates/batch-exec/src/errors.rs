use thiserror::Error;

/// Failures at the oracle boundary. Execution itself never errors out of
/// the executor; bails are reported inside [`crate::BatchExecutionResult`].
#[derive(Debug, Error)]
pub enum ExecError {
    /// The oracle's raw response matched no known wire shape.
    #[error("undecodable plan: {0}")]
    PlanDecode(String),

    /// The oracle call itself failed.
    #[error("oracle error: {0}")]
    Oracle(String),
}
