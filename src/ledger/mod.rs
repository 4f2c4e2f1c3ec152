//! Resume ledger and output sinks
//!
//! The resume ledger is the set of segment ids already committed to the
//! accepted-fact ledger at process start. It is loaded once; segments it
//! contains are skipped before any oracle call, which makes an interrupted
//! run restartable without duplicate rows. Storage behind the set is
//! abstracted so resume logic does not depend on the on-disk format.

pub mod sink;
pub mod table;

use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from ledger files.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed ledger: {0}")]
    Malformed(String),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Persisted-set interface over already-committed segment ids.
///
/// The pipeline only ever asks two things of resume state: has this
/// segment been committed, and record that it now is. Grows
/// monotonically within a run.
pub trait ProcessedSet: Send {
    fn contains(&self, id: i64) -> bool;
    fn insert(&mut self, id: i64);
}

/// In-memory set, seeded from the accepted ledger at startup.
#[derive(Debug, Default)]
pub struct InMemorySet {
    ids: HashSet<i64>,
}

impl InMemorySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl ProcessedSet for InMemorySet {
    fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    fn insert(&mut self, id: i64) {
        self.ids.insert(id);
    }
}

/// Load resume state from an existing accepted-fact ledger.
///
/// A missing file means a fresh run. A file that cannot be read or parsed
/// is logged and treated as empty — the cost is reprocessing, never a
/// failed startup.
pub fn load_resume_set(path: impl AsRef<Path>) -> InMemorySet {
    let path = path.as_ref();
    if !path.exists() {
        debug!(path = %path.display(), "no accepted ledger yet, starting fresh");
        return InMemorySet::new();
    }

    match parse_committed_ids(path) {
        Ok(set) => {
            debug!(
                path = %path.display(),
                committed = set.len(),
                "loaded resume state from accepted ledger"
            );
            set
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "could not read existing accepted ledger, resuming from empty state"
            );
            InMemorySet::new()
        }
    }
}

fn parse_committed_ids(path: &Path) -> LedgerResult<InMemorySet> {
    let content = std::fs::read_to_string(path)?;
    let records = table::parse_records(&content, '|');

    let mut rows = records.into_iter();
    let header = rows
        .next()
        .ok_or_else(|| LedgerError::Malformed("empty ledger file".to_string()))?;
    let id_column = header
        .iter()
        .position(|name| name == "segment_id")
        .ok_or_else(|| LedgerError::Malformed("no segment_id column in header".to_string()))?;

    let mut set = InMemorySet::new();
    for row in rows {
        let raw = row.get(id_column).ok_or_else(|| {
            LedgerError::Malformed(format!("row with {} fields, expected id at {}", row.len(), id_column))
        })?;
        let id: i64 = raw
            .trim()
            .parse()
            .map_err(|_| LedgerError::Malformed(format!("non-integer segment id: {}", raw)))?;
        set.insert(id);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("facts.psv")).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        dir
    }

    // --- Scenario: Resume set loads committed ids from the ledger ---

    #[test]
    fn committed_ids_populate_the_set() {
        let dir = write_temp(
            "segment_id|conversation_id|triplet\n\
             1|a|\"\"\"Mary\"\"|\"\"met\"\"|\"\"John\"\"\"\n\
             3|a|\"\"\"Mary\"\"|\"\"thanked\"\"|\"\"John\"\"\"\n",
        );
        let set = load_resume_set(dir.path().join("facts.psv"));
        assert!(set.contains(1));
        assert!(set.contains(3));
        assert!(!set.contains(2));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn missing_file_yields_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let set = load_resume_set(dir.path().join("nope.psv"));
        assert!(set.is_empty());
    }

    // --- Scenario: Parse failure degrades to empty state, never fatal ---

    #[test]
    fn garbage_ledger_degrades_to_empty_set() {
        let dir = write_temp("segment_id|conversation_id|triplet\nnot-a-number|a|x\n");
        let set = load_resume_set(dir.path().join("facts.psv"));
        assert!(set.is_empty());
    }

    #[test]
    fn wrong_header_degrades_to_empty_set() {
        let dir = write_temp("chunk|conv|fact\n1|a|x\n");
        let set = load_resume_set(dir.path().join("facts.psv"));
        assert!(set.is_empty());
    }

    // --- Scenario: Set grows monotonically within a run ---

    #[test]
    fn inserts_are_visible_and_idempotent() {
        let mut set = InMemorySet::new();
        assert!(!set.contains(42));
        set.insert(42);
        set.insert(42);
        assert!(set.contains(42));
        assert_eq!(set.len(), 1);
    }
}
