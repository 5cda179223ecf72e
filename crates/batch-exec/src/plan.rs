//! Plan model and the decision-oracle boundary.
//!
//! The oracle historically answered in two wire shapes: a single action
//! object and a batch of actions. Both (plus a bare array) deserialize into
//! [`RawPlan`] and are normalized immediately into one ordered `Vec<PlanItem>`
//! — downstream code never branches on which shape arrived.

use async_trait::async_trait;
use pagepilot_core_types::Operation;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ExecError;

/// Terminal verdict kind from the oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictKind {
    Done,
    Failed,
}

/// Terminal verdict: the oracle judged the overall goal finished or failed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub kind: VerdictKind,
    pub reason: String,
}

/// One queued item in a plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlanItem {
    /// Replay a stored playbook by name.
    Reference { playbook: String },

    /// Terminal verdict; execution stops here.
    Verdict {
        verdict: VerdictKind,
        #[serde(default)]
        reason: String,
    },

    /// A concrete operation.
    Op(Operation),
}

/// Raw oracle response shapes, normalized away at the boundary.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPlan {
    Batch { actions: Vec<PlanItem> },
    Single { action: PlanItem },
    List(Vec<PlanItem>),
}

impl RawPlan {
    fn normalize(self) -> Vec<PlanItem> {
        match self {
            RawPlan::Batch { actions } => actions,
            RawPlan::Single { action } => vec![action],
            RawPlan::List(items) => items,
        }
    }
}

/// Decode an oracle response into a canonical ordered plan.
pub fn parse_plan(raw: &Value) -> Result<Vec<PlanItem>, ExecError> {
    let plan: RawPlan = serde_json::from_value(raw.clone())
        .map_err(|err| ExecError::PlanDecode(err.to_string()))?;
    Ok(plan.normalize())
}

/// External reasoning service that inspects page state and returns the next
/// plan. Consumed capability; the core tolerates an oracle that references
/// unknown playbook names.
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    async fn plan(
        &self,
        page_state: &Value,
        history: &[String],
        playbook_summary: &str,
    ) -> Result<Vec<PlanItem>, ExecError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagepilot_core_types::Target;
    use serde_json::json;

    #[test]
    fn batch_shape_normalizes_in_order() {
        let raw = json!({
            "actions": [
                { "op": "click", "target": { "selector": "#search" } },
                { "op": "type", "target": { "selector": "#search" }, "text": "cats" },
                { "playbook": "submit-search" },
                { "verdict": "done", "reason": "results visible" }
            ]
        });
        let plan = parse_plan(&raw).unwrap();
        assert_eq!(plan.len(), 4);
        assert_eq!(
            plan[0],
            PlanItem::Op(Operation::Click {
                target: Target::selector("#search")
            })
        );
        assert_eq!(
            plan[2],
            PlanItem::Reference {
                playbook: "submit-search".into()
            }
        );
        assert_eq!(
            plan[3],
            PlanItem::Verdict {
                verdict: VerdictKind::Done,
                reason: "results visible".into()
            }
        );
    }

    #[test]
    fn legacy_single_action_shape_still_decodes() {
        let raw = json!({ "action": { "op": "press", "key": "Enter" } });
        let plan = parse_plan(&raw).unwrap();
        assert_eq!(plan, vec![PlanItem::Op(Operation::Press { key: "Enter".into() })]);
    }

    #[test]
    fn bare_array_decodes() {
        let raw = json!([{ "op": "wait", "duration_ms": 250 }]);
        let plan = parse_plan(&raw).unwrap();
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn verdict_reason_defaults_to_empty() {
        let raw = json!({ "actions": [{ "verdict": "failed" }] });
        let plan = parse_plan(&raw).unwrap();
        assert_eq!(
            plan[0],
            PlanItem::Verdict {
                verdict: VerdictKind::Failed,
                reason: String::new()
            }
        );
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let raw = json!({ "something": "else" });
        assert!(matches!(parse_plan(&raw), Err(ExecError::PlanDecode(_))));
    }
}
