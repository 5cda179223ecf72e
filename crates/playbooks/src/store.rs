//! In-memory, domain-scoped playbook store with explicit persistence
//! checkpoints.
//!
//! Exactly one task drives one store instance at a time within a session,
//! so the lock here is plain uniformity, not a multi-writer design.
//! Concurrent processes flushing the same domain race on the file; last
//! whole-file write wins.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::Utc;
use parking_lot::RwLock;
use pagepilot_core_types::{Operation, Viewport};
use tracing::{debug, info, warn};

use crate::errors::PlaybookError;
use crate::model::{playbook_id, Playbook, RecordedOperation};
use crate::persist::{self, DomainFile};
use crate::stitch::{auto_name, STITCH_WINDOW};

/// Result of expanding a playbook for replay: the rescaled operations plus
/// the stored handle for success/failure bookkeeping afterwards.
#[derive(Clone, Debug)]
pub struct Expansion {
    pub operations: Vec<Operation>,
    pub playbook: Playbook,
}

#[derive(Default)]
struct DomainState {
    playbooks: Vec<Playbook>,
    dirty: bool,
}

/// Domain-scoped playbook repository.
///
/// Domains load lazily on first touch and flush to disk only at explicit
/// checkpoints. The store never deletes playbooks; pruning is an external
/// policy.
pub struct PlaybookStore {
    root: PathBuf,
    domains: RwLock<HashMap<String, DomainState>>,
}

impl PlaybookStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            domains: RwLock::new(HashMap::new()),
        }
    }

    /// Record a new playbook. Duplicate names may coexist; `find` resolves
    /// ambiguity by preferring exact matches.
    pub fn record(
        &self,
        domain: &str,
        page_path: &str,
        name: &str,
        operations: Vec<RecordedOperation>,
        viewport: Viewport,
    ) -> Playbook {
        self.ensure_loaded(domain);
        let now = Utc::now();
        let playbook = Playbook {
            id: playbook_id(&operations),
            name: name.to_string(),
            domain: domain.to_string(),
            page_path: page_path.to_string(),
            operations,
            recorded_viewport: viewport,
            success_count: 0,
            fail_count: 0,
            last_used: now,
            created_at: now,
        };

        info!(
            domain,
            name,
            steps = playbook.operations.len(),
            "recorded playbook"
        );
        let mut domains = self.domains.write();
        let state = domains.entry(domain.to_string()).or_default();
        state.playbooks.push(playbook.clone());
        state.dirty = true;
        playbook
    }

    /// Look a playbook up by name: case-insensitive exact match first, then
    /// first case-insensitive substring match. Never fails.
    pub fn find(&self, domain: &str, name: &str) -> Option<Playbook> {
        self.ensure_loaded(domain);
        let needle = name.to_lowercase();
        let domains = self.domains.read();
        let state = domains.get(domain)?;

        if let Some(exact) = state
            .playbooks
            .iter()
            .find(|p| p.name.to_lowercase() == needle)
        {
            return Some(exact.clone());
        }
        state
            .playbooks
            .iter()
            .find(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
    }

    /// Expand a playbook for replay at the current viewport: every stored
    /// position is re-anchored so an operation recorded at one window size
    /// lands at the same relative spot at another.
    pub fn expand(&self, domain: &str, name: &str, current: Viewport) -> Option<Expansion> {
        let playbook = self.find(domain, name)?;
        let operations = playbook
            .operations
            .iter()
            .map(|step| {
                let mut op = step.operation.clone();
                if let Some(position) = step.position {
                    if let Some(target) = op.target_mut() {
                        target.position = Some(position.rescaled_to(current));
                    }
                }
                op
            })
            .collect();
        Some(Expansion {
            operations,
            playbook,
        })
    }

    /// Bump the success counter and touch `last_used`.
    pub fn mark_success(&self, playbook: &Playbook) {
        self.mark(playbook, true);
    }

    /// Bump the failure counter and touch `last_used`.
    pub fn mark_failure(&self, playbook: &Playbook) {
        self.mark(playbook, false);
    }

    fn mark(&self, playbook: &Playbook, success: bool) {
        let mut domains = self.domains.write();
        let Some(state) = domains.get_mut(&playbook.domain) else {
            return;
        };
        let Some(stored) = state
            .playbooks
            .iter_mut()
            .find(|p| p.id == playbook.id && p.name == playbook.name)
        else {
            return;
        };
        if success {
            stored.success_count += 1;
        } else {
            stored.fail_count += 1;
        }
        stored.last_used = Utc::now();
        state.dirty = true;
        debug!(
            domain = %playbook.domain,
            name = %playbook.name,
            success,
            "playbook outcome recorded"
        );
    }

    /// Human/machine-readable listing of a domain's playbooks, for injection
    /// into the planner's next call so it can reference them by exact name.
    pub fn summary(&self, domain: &str) -> String {
        self.ensure_loaded(domain);
        let domains = self.domains.read();
        let playbooks = domains
            .get(domain)
            .map(|state| state.playbooks.as_slice())
            .unwrap_or_default();

        if playbooks.is_empty() {
            return format!("no playbooks recorded for {}", domain);
        }

        let mut lines = Vec::with_capacity(playbooks.len());
        for playbook in playbooks {
            let steps: Vec<String> = playbook
                .operations
                .iter()
                .map(RecordedOperation::describe)
                .collect();
            lines.push(format!(
                "- {} ({} steps, {}% reliable): {}",
                playbook.name,
                playbook.step_count(),
                playbook.reliability_pct(),
                steps.join(" -> ")
            ));
        }
        lines.join("\n")
    }

    /// Retroactively group a completed task's operation log into playbooks:
    /// greedy non-overlapping windows of up to [`STITCH_WINDOW`] operations.
    /// A window whose auto-name already exists bumps that playbook's success
    /// counter instead of creating a duplicate, so re-stitching the same log
    /// is idempotent. Returns only the newly created playbooks.
    pub fn stitch_from_log(
        &self,
        domain: &str,
        page_path: &str,
        log: &[RecordedOperation],
        viewport: Viewport,
    ) -> Vec<Playbook> {
        self.ensure_loaded(domain);
        let mut created = Vec::new();
        let mut index = 0;

        while index < log.len() {
            let end = (index + STITCH_WINDOW).min(log.len());
            let window = &log[index..end];
            let name = auto_name(window);

            if name.is_empty() {
                index = end;
                continue;
            }

            if let Some(existing) = self.find_exact(domain, &name) {
                debug!(domain, name, "stitch window matches existing playbook");
                self.mark_success(&existing);
            } else {
                created.push(self.record(domain, page_path, &name, window.to_vec(), viewport));
            }
            index = end;
        }

        if !created.is_empty() {
            info!(domain, count = created.len(), "stitched new playbooks from task log");
        }
        created
    }

    /// All playbooks for a domain (clone-out).
    pub fn playbooks(&self, domain: &str) -> Vec<Playbook> {
        self.ensure_loaded(domain);
        let domains = self.domains.read();
        domains
            .get(domain)
            .map(|state| state.playbooks.clone())
            .unwrap_or_default()
    }

    /// Flush one domain to disk if it has unsaved changes.
    pub fn flush(&self, domain: &str) -> Result<(), PlaybookError> {
        let file = {
            let mut domains = self.domains.write();
            let Some(state) = domains.get_mut(domain) else {
                return Ok(());
            };
            if !state.dirty {
                return Ok(());
            }
            state.dirty = false;
            DomainFile {
                domain: domain.to_string(),
                playbooks: state.playbooks.clone(),
            }
        };
        let path = persist::store_domain(&self.root, &file)?;
        info!(domain, path = %path.display(), playbooks = file.playbooks.len(), "flushed playbooks");
        Ok(())
    }

    /// Flush every loaded domain with unsaved changes.
    pub fn flush_all(&self) -> Result<(), PlaybookError> {
        let loaded: Vec<String> = self.domains.read().keys().cloned().collect();
        for domain in loaded {
            self.flush(&domain)?;
        }
        Ok(())
    }

    fn find_exact(&self, domain: &str, name: &str) -> Option<Playbook> {
        let needle = name.to_lowercase();
        let domains = self.domains.read();
        domains
            .get(domain)?
            .playbooks
            .iter()
            .find(|p| p.name.to_lowercase() == needle)
            .cloned()
    }

    fn ensure_loaded(&self, domain: &str) {
        {
            let domains = self.domains.read();
            if domains.contains_key(domain) {
                return;
            }
        }

        let playbooks = match persist::load_domain(&self.root, domain) {
            Ok(Some(file)) => {
                debug!(domain, count = file.playbooks.len(), "loaded playbooks from disk");
                file.playbooks
            }
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(domain, %err, "failed to load playbooks, starting empty");
                Vec::new()
            }
        };

        let mut domains = self.domains.write();
        domains.entry(domain.to_string()).or_insert(DomainState {
            playbooks,
            dirty: false,
        });
    }
}
