use thiserror::Error;

/// Failures surfaced by playbook persistence. In-memory store operations do
/// not fail; only explicit load/flush checkpoints can.
#[derive(Debug, Error)]
pub enum PlaybookError {
    #[error("playbook store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("playbook store codec error: {0}")]
    Codec(String),
}
