//! On-disk format: one JSON document per domain, replaced wholesale at each
//! checkpoint.
//!
//! Writes go through a temp file and rename so a crashed checkpoint never
//! leaves a torn file. Concurrent processes writing the same domain are
//! unsynchronized: last whole-file write wins.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::PlaybookError;
use crate::model::Playbook;

/// Persisted per-domain document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DomainFile {
    pub domain: String,
    pub playbooks: Vec<Playbook>,
}

/// File path for a domain's playbooks under `root`.
pub fn domain_path(root: &Path, domain: &str) -> PathBuf {
    root.join(format!("{}.json", sanitize_domain(domain)))
}

fn sanitize_domain(domain: &str) -> String {
    domain
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Load a domain's playbooks; `Ok(None)` when nothing was persisted yet.
pub fn load_domain(root: &Path, domain: &str) -> Result<Option<DomainFile>, PlaybookError> {
    let path = domain_path(root, domain);
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read(&path)?;
    let file = serde_json::from_slice(&data)
        .map_err(|err| PlaybookError::Codec(format!("{}: {}", path.display(), err)))?;
    Ok(Some(file))
}

/// Atomically replace a domain's persisted playbooks.
pub fn store_domain(root: &Path, file: &DomainFile) -> Result<PathBuf, PlaybookError> {
    let path = domain_path(root, &file.domain);
    let data =
        serde_json::to_vec_pretty(file).map_err(|err| PlaybookError::Codec(err.to_string()))?;
    write_atomic(path, &data).map_err(PlaybookError::from)
}

fn write_atomic(path: PathBuf, data: &[u8]) -> io::Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(tmp, &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{playbook_id, RecordedOperation};
    use chrono::Utc;
    use pagepilot_core_types::{Operation, Target, Viewport};

    fn sample_playbook(domain: &str) -> Playbook {
        let operations = vec![RecordedOperation::new(Operation::Click {
            target: Target::selector("#go"),
        })];
        Playbook {
            id: playbook_id(&operations),
            name: "go".into(),
            domain: domain.into(),
            page_path: "/".into(),
            operations,
            recorded_viewport: Viewport::new(1440, 900),
            success_count: 2,
            fail_count: 0,
            last_used: Utc::now(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn round_trips_a_domain_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = DomainFile {
            domain: "example.com".into(),
            playbooks: vec![sample_playbook("example.com")],
        };

        store_domain(dir.path(), &file).unwrap();
        let loaded = load_domain(dir.path(), "example.com").unwrap().unwrap();
        assert_eq!(loaded.domain, "example.com");
        assert_eq!(loaded.playbooks.len(), 1);
        assert_eq!(loaded.playbooks[0].id, file.playbooks[0].id);
        assert_eq!(loaded.playbooks[0].success_count, 2);
    }

    #[test]
    fn missing_domain_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_domain(dir.path(), "nowhere.test").unwrap().is_none());
    }

    #[test]
    fn hostnames_map_to_safe_filenames() {
        let root = Path::new("/store");
        assert_eq!(
            domain_path(root, "shop.Example.com"),
            root.join("shop.example.com.json")
        );
        assert_eq!(
            domain_path(root, "evil/../host:8080"),
            root.join("evil_.._host_8080.json")
        );
    }
}
