//! Batch execution results.

use playbooks::RecordedOperation;
use serde::{Deserialize, Serialize};

use crate::plan::Verdict;

/// Per-step outcome inside a batch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepOutcome {
    pub description: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepOutcome {
    pub fn succeeded(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            success: true,
            error: None,
        }
    }

    pub fn failed(description: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Everything the caller learns from one batch. The executor always returns
/// one of these — bails are data, not errors.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BatchExecutionResult {
    /// Ordered per-step outcomes, including failed and skipped slots.
    pub steps: Vec<StepOutcome>,

    /// Number of steps that completed successfully.
    pub completed_count: usize,

    /// Terminal verdict, passed through untouched when the plan carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,

    /// The page URL changed relative to batch start.
    pub url_changed: bool,

    /// Why the batch stopped early, if it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bail_reason: Option<String>,

    /// Operations that actually ran inline, with captured positions — the
    /// raw material for playbook creation and stitching.
    pub recorded: Vec<RecordedOperation>,
}

impl BatchExecutionResult {
    /// A batch is clean when it ran to completion without bailing.
    pub fn is_clean(&self) -> bool {
        self.bail_reason.is_none()
    }
}
