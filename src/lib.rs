//! Pagepilot: a self-teaching web automation core.
//!
//! The engine drives a perceive → decide → act loop against a live page.
//! An external decision oracle supplies plans of discrete UI operations;
//! the [`batch_exec::BatchExecutor`] walks them against a
//! [`browser_driver::BrowserDriver`], gating each transition on the
//! [`settle_detect`] primitive and bailing out safely when the page's
//! structure stops matching the plan's assumptions. Successful sequences
//! crystallize into [`playbooks`] that later visits replay — at any
//! viewport size — instead of re-planning from scratch.

pub use batch_exec::{
    parse_plan, BatchExecutionResult, BatchExecutor, DecisionOracle, ExecError, ExecutorConfig,
    PlanItem, StepOutcome, Verdict, VerdictKind,
};
pub use browser_driver::{probes, BrowserDriver, DriverError};
pub use pagepilot_core_types::{
    to_absolute, to_relative, Operation, RelativePosition, ScrollDirection, ScrollOffset, Target,
    Viewport,
};
pub use playbooks::{auto_name, Expansion, Playbook, PlaybookStore, RecordedOperation};
pub use settle_detect::{wait_for_settle, SettleOptions, SettleOutcome, SettleReason};
