//! The batch executor state machine.

use std::sync::Arc;

use browser_driver::{probes, BrowserDriver, DriverError};
use pagepilot_core_types::ops::{DEFAULT_SCROLL_AMOUNT, DEFAULT_WAIT_MS};
use pagepilot_core_types::{to_absolute, Operation, RelativePosition, Target, Viewport};
use playbooks::{auto_name, PlaybookStore, RecordedOperation};
use settle_detect::{wait_for_settle, SettleOptions};
use tracing::{debug, info, warn};

use crate::plan::{PlanItem, Verdict};
use crate::result::{BatchExecutionResult, StepOutcome};

/// Executor tuning.
#[derive(Clone, Copy, Debug)]
pub struct ExecutorConfig {
    /// Settle wait applied between steps.
    pub settle: SettleOptions,

    /// Defensive cap on executed steps per batch (expanded sub-steps
    /// included) to bound worst-case blind execution.
    pub max_steps_per_batch: usize,

    /// Record a clean batch of two or more inline operations as a playbook.
    pub auto_record: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            settle: SettleOptions::default(),
            max_steps_per_batch: 16,
            auto_record: true,
        }
    }
}

/// What a between-steps check decided.
enum Gate {
    Proceed,
    Bail { reason: String, url_changed: bool },
}

/// Walks a planned operation list against the driver, one step at a time.
///
/// The executor only borrows playbooks transiently during expansion and
/// never mutates their stored operations; bookkeeping goes through the
/// store's API. Every outcome — including every bail — comes back as a
/// normal [`BatchExecutionResult`].
pub struct BatchExecutor {
    driver: Arc<dyn BrowserDriver>,
    config: ExecutorConfig,
}

impl BatchExecutor {
    pub fn new(driver: Arc<dyn BrowserDriver>) -> Self {
        Self::with_config(driver, ExecutorConfig::default())
    }

    pub fn with_config(driver: Arc<dyn BrowserDriver>, config: ExecutorConfig) -> Self {
        Self { driver, config }
    }

    /// Execute one plan. `domain`/`page_path` scope playbook lookups and
    /// recordings in `store`.
    pub async fn execute(
        &self,
        plan: &[PlanItem],
        store: &PlaybookStore,
        domain: &str,
        page_path: &str,
    ) -> BatchExecutionResult {
        let mut result = BatchExecutionResult::default();
        let start_url = probes::current_url(self.driver.as_ref()).await;
        let viewport = probes::viewport(self.driver.as_ref())
            .await
            .map(|(viewport, _)| viewport)
            .unwrap_or_default();
        let mut executed = 0usize;

        debug!(items = plan.len(), domain, "starting batch");

        'batch: for (index, item) in plan.iter().enumerate() {
            match item {
                PlanItem::Verdict { verdict, reason } => {
                    // Terminal step: hand it back to the caller untouched.
                    result.verdict = Some(Verdict {
                        kind: *verdict,
                        reason: reason.clone(),
                    });
                    break;
                }

                PlanItem::Reference { playbook: name } => {
                    let Some(expansion) = store.expand(domain, name, viewport) else {
                        // A hallucinated reference never aborts the plan.
                        warn!(domain, name, "referenced playbook not found, skipping");
                        result.steps.push(StepOutcome::failed(
                            format!("playbook \"{}\"", name),
                            "playbook not found",
                        ));
                        continue;
                    };

                    info!(domain, name, steps = expansion.operations.len(), "replaying playbook");
                    let sub_total = expansion.operations.len();
                    for (sub_index, op) in expansion.operations.iter().enumerate() {
                        if executed >= self.config.max_steps_per_batch {
                            result.bail_reason = Some("batch step limit reached".into());
                            break 'batch;
                        }
                        executed += 1;

                        match self.run_operation(op, viewport).await {
                            Ok(_) => result.steps.push(StepOutcome::succeeded(op.describe())),
                            Err(err) => {
                                result.steps.push(StepOutcome::failed(op.describe(), err.to_string()));
                                store.mark_failure(&expansion.playbook);
                                result.bail_reason = Some(format!(
                                    "playbook \"{}\" failed at step {}: {}",
                                    name, sub_index, err
                                ));
                                break 'batch;
                            }
                        }

                        let last_sub = sub_index + 1 == sub_total;
                        let last_overall = last_sub && index + 1 == plan.len();
                        if last_overall {
                            continue;
                        }

                        let next = if last_sub {
                            next_concrete(plan, index + 1)
                        } else {
                            Some(&expansion.operations[sub_index + 1])
                        };
                        match self.between_steps(&start_url, next).await {
                            Gate::Proceed => {}
                            Gate::Bail { reason, url_changed } => {
                                result.url_changed = url_changed;
                                if last_sub {
                                    // The expansion itself ran to completion.
                                    store.mark_success(&expansion.playbook);
                                    result.bail_reason = Some(reason);
                                } else {
                                    result.bail_reason = Some(format!(
                                        "playbook \"{}\" at step {}: {}",
                                        name, sub_index, reason
                                    ));
                                }
                                break 'batch;
                            }
                        }
                    }

                    store.mark_success(&expansion.playbook);
                }

                PlanItem::Op(op) => {
                    if executed >= self.config.max_steps_per_batch {
                        result.bail_reason = Some("batch step limit reached".into());
                        break;
                    }
                    executed += 1;

                    match self.run_operation(op, viewport).await {
                        Err(err) => {
                            result.steps.push(StepOutcome::failed(op.describe(), err.to_string()));
                            result.bail_reason = Some(format!("action failed: {}", err));
                            break;
                        }
                        Ok(position) => {
                            result.steps.push(StepOutcome::succeeded(op.describe()));
                            let mut recorded = RecordedOperation::new(op.clone());
                            recorded.position = position;
                            result.recorded.push(recorded);

                            if index + 1 < plan.len() {
                                match self.between_steps(&start_url, next_concrete(plan, index + 1)).await {
                                    Gate::Proceed => {}
                                    Gate::Bail { reason, url_changed } => {
                                        result.url_changed = url_changed;
                                        result.bail_reason = Some(reason);
                                        break 'batch;
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        result.completed_count = result.steps.iter().filter(|s| s.success).count();

        if self.config.auto_record && result.is_clean() && result.recorded.len() >= 2 {
            let name = auto_name(&result.recorded);
            match store.find(domain, &name) {
                Some(existing) if existing.name.eq_ignore_ascii_case(&name) => {
                    // Same sequence already crystallized; count the reuse.
                    store.mark_success(&existing);
                }
                _ => {
                    store.record(domain, page_path, &name, result.recorded.clone(), viewport);
                }
            }
        }

        debug!(
            completed = result.completed_count,
            bail = result.bail_reason.as_deref().unwrap_or("none"),
            "batch finished"
        );
        result
    }

    /// Settle, then verify the batch's assumptions still hold: same URL,
    /// and the next queued target (when it has a selector) still present.
    async fn between_steps(&self, start_url: &Option<String>, next: Option<&Operation>) -> Gate {
        wait_for_settle(self.driver.as_ref(), &self.config.settle).await;

        if let Some(start) = start_url {
            if let Some(now) = probes::current_url(self.driver.as_ref()).await {
                if &now != start {
                    debug!(from = %start, to = %now, "navigation detected mid-batch");
                    return Gate::Bail {
                        reason: "URL changed".into(),
                        url_changed: true,
                    };
                }
            }
        }

        if let Some(selector) = next
            .and_then(Operation::target)
            .and_then(|target| target.selector.as_deref())
        {
            // A probe that cannot run is an implicit pass, same policy as
            // the settle detector.
            if probes::selector_exists(self.driver.as_ref(), selector).await == Some(false) {
                return Gate::Bail {
                    reason: format!("next target missing: {}", selector),
                    url_changed: false,
                };
            }
        }

        Gate::Proceed
    }

    /// Execute one operation, returning the captured screen position when
    /// the operation had a resolvable one.
    async fn run_operation(
        &self,
        op: &Operation,
        viewport: Viewport,
    ) -> Result<Option<RelativePosition>, DriverError> {
        let driver = self.driver.as_ref();
        match op {
            Operation::Click { target } => {
                if let Some(selector) = self.resolve_selector(target).await? {
                    let position = probes::element_center(driver, &selector).await;
                    driver.click(&selector).await?;
                    Ok(position)
                } else if let Some(position) = target.position {
                    let (x, y) = to_absolute(&position, viewport);
                    driver.click_at(x, y).await?;
                    Ok(Some(position.rescaled_to(viewport)))
                } else {
                    Err(DriverError::NotFound("click target unresolvable".into()))
                }
            }
            Operation::Type { target, text } => {
                let selector = self
                    .resolve_selector(target)
                    .await?
                    .ok_or_else(|| DriverError::NotFound("type target unresolvable".into()))?;
                let position = probes::element_center(driver, &selector).await;
                driver.type_text(&selector, text).await?;
                Ok(position)
            }
            Operation::Press { key } => {
                driver.press(key).await?;
                Ok(None)
            }
            Operation::Scroll { direction, amount } => {
                driver
                    .scroll(*direction, amount.unwrap_or(DEFAULT_SCROLL_AMOUNT))
                    .await?;
                Ok(None)
            }
            Operation::Hover { target } => {
                let selector = self
                    .resolve_selector(target)
                    .await?
                    .ok_or_else(|| DriverError::NotFound("hover target unresolvable".into()))?;
                let position = probes::element_center(driver, &selector).await;
                driver.hover(&selector).await?;
                Ok(position)
            }
            Operation::Wait { duration_ms } => {
                driver.wait(duration_ms.unwrap_or(DEFAULT_WAIT_MS)).await?;
                Ok(None)
            }
        }
    }

    /// Resolve a target to a selector. Labels are late-bound: looked up
    /// fresh here, immediately before execution.
    async fn resolve_selector(&self, target: &Target) -> Result<Option<String>, DriverError> {
        if let Some(selector) = &target.selector {
            return Ok(Some(selector.clone()));
        }
        if let Some(label) = &target.label {
            return match probes::resolve_label(self.driver.as_ref(), label).await {
                Some(selector) => {
                    debug!(label, selector, "resolved label target");
                    Ok(Some(selector))
                }
                None => Err(DriverError::NotFound(format!(
                    "no element with visible label \"{}\"",
                    label
                ))),
            };
        }
        Ok(None)
    }
}

/// The next concrete operation at or after `index`, if the very next queued
/// item is one. References and verdicts have no pre-checkable target.
fn next_concrete(plan: &[PlanItem], index: usize) -> Option<&Operation> {
    match plan.get(index) {
        Some(PlanItem::Op(op)) => Some(op),
        _ => None,
    }
}
