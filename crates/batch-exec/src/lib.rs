//! Operation batch executor.
//!
//! Consumes a plan produced by an external decision oracle — concrete
//! operations, playbook references and an optional terminal verdict — and
//! walks it step by step against the browser driver. Between steps it waits
//! for the page to settle and applies bail-out checks, because a pre-planned
//! multi-step batch runs without re-consulting the oracle: the checks are
//! the only safety net against a plan whose assumptions were invalidated by
//! an earlier step's side effects.

pub mod errors;
pub mod executor;
pub mod plan;
pub mod result;

pub use errors::ExecError;
pub use executor::{BatchExecutor, ExecutorConfig};
pub use plan::{parse_plan, DecisionOracle, PlanItem, Verdict, VerdictKind};
pub use result::{BatchExecutionResult, StepOutcome};
