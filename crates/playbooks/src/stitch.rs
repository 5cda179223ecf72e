//! Auto-naming for stitched playbooks.
//!
//! Stitching itself lives on [`crate::store::PlaybookStore`]; this module
//! holds the window size and the name derivation shared with inline batch
//! recording.

use crate::model::RecordedOperation;

/// Maximum operations consumed per stitched playbook.
pub const STITCH_WINDOW: usize = 6;

/// How many step descriptions contribute to an auto-generated name.
const NAME_STEPS: usize = 3;

/// Derive a stable name from an operation window: up to three non-wait step
/// descriptions joined by an arrow. Waits carry no intent, so they never
/// name a playbook unless the window holds nothing else.
pub fn auto_name(operations: &[RecordedOperation]) -> String {
    let parts: Vec<String> = operations
        .iter()
        .filter(|op| !op.operation.is_wait())
        .take(NAME_STEPS)
        .map(RecordedOperation::describe)
        .collect();

    if parts.is_empty() {
        operations
            .first()
            .map(RecordedOperation::describe)
            .unwrap_or_default()
    } else {
        parts.join(" -> ")
    }
}
