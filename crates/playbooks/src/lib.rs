//! Playbook store: persistent, domain-scoped repositories of named
//! operation sequences.
//!
//! A playbook is a replayable recording of operations that once succeeded
//! against a page. The store records them, finds them by name for the
//! planner, expands them for replay at a possibly different viewport size,
//! tracks their reliability, and retroactively stitches a completed task's
//! operation log into new playbooks.

pub mod errors;
pub mod model;
pub mod persist;
pub mod stitch;
pub mod store;

pub use errors::PlaybookError;
pub use model::{playbook_id, Playbook, RecordedOperation};
pub use stitch::{auto_name, STITCH_WINDOW};
pub use store::{Expansion, PlaybookStore};
