//! Shared helpers for integration tests

use anaphora::ledger::table::{format_row, parse_records};
use std::path::{Path, PathBuf};

/// Write a segment table file and return its path.
pub fn write_segment_table(dir: &Path, rows: &[(i64, &str, &str)]) -> PathBuf {
    let mut content = String::from("segment_id,conversation_id,text\n");
    for &(id, conversation, text) in rows {
        let id = id.to_string();
        content.push_str(&format_row(&[id.as_str(), conversation, text], ','));
        content.push('\n');
    }
    let path = dir.join("segments.csv");
    std::fs::write(&path, content).unwrap();
    path
}

/// Read a ledger back as rows, header included.
pub fn read_ledger(path: &Path) -> Vec<Vec<String>> {
    parse_records(&std::fs::read_to_string(path).unwrap(), '|')
}

/// Segment ids of the data rows (header skipped).
pub fn ledger_ids(path: &Path) -> Vec<String> {
    read_ledger(path)
        .into_iter()
        .skip(1)
        .map(|row| row[0].clone())
        .collect()
}
