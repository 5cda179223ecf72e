//! Adaptive settle detection.
//!
//! After an operation fires, the page may keep mutating for a while
//! (re-renders, lazy content, animations). [`wait_for_settle`] senses when
//! the DOM has gone quiet so the executor knows it is safe to inspect the
//! page again, without ever blocking past a hard cap.
//!
//! The primitive is deliberately infallible: if the mutation watch cannot be
//! installed or polled — most commonly because a navigation destroyed the
//! execution context mid-call — the failure is swallowed and reported as an
//! implicit settle. Navigation is itself evidence of a state transition, so
//! the executor can call this unconditionally after every step.

use std::time::{Duration, Instant};

use browser_driver::BrowserDriver;
use serde_json::Value;
use tracing::{debug, trace};

/// Interval between quiet-window polls.
const POLL_INTERVAL_MS: u64 = 50;

/// Script that installs (or re-arms) the DOM mutation watch.
const INSTALL_WATCH: &str = r#"(() => {
  const w = window;
  if (!w.__settleWatch) {
    w.__settleWatch = { last: Date.now() };
    const target = document.body || document.documentElement;
    const observer = new MutationObserver(() => { w.__settleWatch.last = Date.now(); });
    observer.observe(target, {
      childList: true, subtree: true, attributes: true, characterData: true
    });
    w.__settleWatch.observer = observer;
  } else {
    w.__settleWatch.last = Date.now();
  }
  return true;
})()"#;

/// Script that reports milliseconds since the last observed mutation.
const QUIET_MS: &str =
    "(() => window.__settleWatch ? Date.now() - window.__settleWatch.last : null)()";

/// Tuning knobs for a settle wait.
#[derive(Clone, Copy, Debug)]
pub struct SettleOptions {
    /// Hard cap: return after this long no matter what the page is doing.
    pub timeout_ms: u64,
    /// Return once this long passes with zero observed mutations.
    pub quiet_ms: u64,
}

impl Default for SettleOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 2000,
            quiet_ms: 100,
        }
    }
}

/// Why a settle wait returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettleReason {
    /// A full quiet window elapsed with no mutations.
    Quiet,
    /// The hard cap fired while the page was still mutating.
    Timeout,
    /// The watch could not be installed or polled; the context is gone,
    /// which counts as an implicit settle.
    ContextLost,
}

/// Outcome of a settle wait. Informational only — there is no failure mode.
#[derive(Clone, Copy, Debug)]
pub struct SettleOutcome {
    pub reason: SettleReason,
    pub elapsed: Duration,
}

/// Wait until the page stops mutating, the hard cap fires, or the page
/// context disappears. Never returns an error and never hangs.
pub async fn wait_for_settle(driver: &dyn BrowserDriver, opts: &SettleOptions) -> SettleOutcome {
    let started = Instant::now();
    let deadline = started + Duration::from_millis(opts.timeout_ms);

    match driver.evaluate(INSTALL_WATCH).await {
        Ok(_) => {}
        Err(err) => {
            debug!(%err, "settle watch install failed, treating as implicit settle");
            return SettleOutcome {
                reason: SettleReason::ContextLost,
                elapsed: started.elapsed(),
            };
        }
    }

    loop {
        let now = Instant::now();
        if now >= deadline {
            debug!(elapsed_ms = started.elapsed().as_millis() as u64, "settle hard cap fired");
            return SettleOutcome {
                reason: SettleReason::Timeout,
                elapsed: started.elapsed(),
            };
        }

        let sleep_for = Duration::from_millis(POLL_INTERVAL_MS).min(deadline - now);
        tokio::time::sleep(sleep_for).await;

        match driver.evaluate(QUIET_MS).await {
            Ok(Value::Number(quiet)) => {
                let quiet_for = quiet.as_f64().unwrap_or(0.0);
                trace!(quiet_for, "settle poll");
                if quiet_for >= opts.quiet_ms as f64 {
                    return SettleOutcome {
                        reason: SettleReason::Quiet,
                        elapsed: started.elapsed(),
                    };
                }
            }
            // Watch vanished (fresh document after navigation) or the poll
            // itself failed: both mean the old page is gone.
            Ok(_) | Err(_) => {
                debug!("settle watch lost, treating as implicit settle");
                return SettleOutcome {
                    reason: SettleReason::ContextLost,
                    elapsed: started.elapsed(),
                };
            }
        }
    }
}
