//! Playbook data model.

use blake3::Hasher;
use chrono::{DateTime, Utc};
use pagepilot_core_types::ops::{DEFAULT_SCROLL_AMOUNT, DEFAULT_WAIT_MS};
use pagepilot_core_types::{Operation, RelativePosition, Target, Viewport};
use serde::{Deserialize, Serialize};

/// An operation plus the execution-time metadata captured when it actually
/// ran: where it landed on screen and a human-readable description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordedOperation {
    pub operation: Operation,

    /// Screen position at execution time, when the operation had one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<RelativePosition>,

    /// Free-text description; falls back to the operation's own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RecordedOperation {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            position: None,
            description: None,
        }
    }

    pub fn with_position(mut self, position: RelativePosition) -> Self {
        self.position = Some(position);
        self
    }

    pub fn describe(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| self.operation.describe())
    }
}

/// A named, persisted, replayable operation sequence scoped to one domain.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Playbook {
    /// Deterministic hash of the sequence's structural content. Identical
    /// sequences always collide to the same id, independent of timestamps
    /// or descriptions.
    pub id: String,
    pub name: String,
    pub domain: String,
    pub page_path: String,
    pub operations: Vec<RecordedOperation>,
    pub recorded_viewport: Viewport,
    pub success_count: u32,
    pub fail_count: u32,
    pub last_used: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Playbook {
    /// Reliability as a percentage; an untried playbook reports 100%.
    pub fn reliability_pct(&self) -> u32 {
        let attempts = self.success_count + self.fail_count;
        if attempts == 0 {
            100
        } else {
            self.success_count * 100 / attempts
        }
    }

    pub fn step_count(&self) -> usize {
        self.operations.len()
    }
}

/// Deterministic id for an operation sequence.
///
/// Hashes only structural content: operation kinds, selectors, labels,
/// typed text, keys, scroll parameters and wait durations. Positions,
/// descriptions and timestamps are excluded so that re-recording the same
/// sequence always yields the same id.
pub fn playbook_id(operations: &[RecordedOperation]) -> String {
    let mut hasher = Hasher::new();
    for recorded in operations {
        hasher.update(structural_key(&recorded.operation).as_bytes());
        hasher.update(b"\n");
    }
    format!("pb_{}", hasher.finalize().to_hex())
}

fn structural_key(op: &Operation) -> String {
    match op {
        Operation::Click { target } => format!("click|{}", target_key(target)),
        Operation::Type { target, text } => format!("type|{}|{}", target_key(target), text),
        Operation::Press { key } => format!("press|{}", key),
        Operation::Scroll { direction, amount } => format!(
            "scroll|{}|{}",
            direction.as_str(),
            amount.unwrap_or(DEFAULT_SCROLL_AMOUNT)
        ),
        Operation::Hover { target } => format!("hover|{}", target_key(target)),
        Operation::Wait { duration_ms } => {
            format!("wait|{}", duration_ms.unwrap_or(DEFAULT_WAIT_MS))
        }
    }
}

fn target_key(target: &Target) -> String {
    target
        .selector
        .clone()
        .or_else(|| target.label.clone())
        .unwrap_or_default()
}
