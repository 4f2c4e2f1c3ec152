//! Input segment table
//!
//! Rows of `(segment_id, conversation_id, text)` read once from a
//! comma-delimited file and sorted ascending by segment id before
//! processing. Segments are immutable once read.

use super::PipelineError;
use crate::ledger::table::parse_records;
use std::path::Path;

/// One unit of input text with an ordering id and a conversation key.
///
/// Pronouns in a segment may refer to entities introduced by earlier
/// segments of the same conversation, never across conversations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub id: i64,
    pub conversation: String,
    pub text: String,
}

/// Load and sort the segment table.
///
/// Expects a header row naming `segment_id`, `conversation_id`, and
/// `text` columns (any order). Quoted text fields may contain commas
/// and line breaks.
pub fn load_segments(path: impl AsRef<Path>) -> Result<Vec<Segment>, PipelineError> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        PipelineError::InvalidInput(format!("cannot read {}: {}", path.as_ref().display(), e))
    })?;
    parse_segments(&content)
}

fn parse_segments(content: &str) -> Result<Vec<Segment>, PipelineError> {
    let mut rows = parse_records(content, ',').into_iter();
    let header = rows
        .next()
        .ok_or_else(|| PipelineError::InvalidInput("empty segment table".to_string()))?;

    let column = |name: &str| {
        header
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| PipelineError::InvalidInput(format!("missing column: {}", name)))
    };
    let id_col = column("segment_id")?;
    let conv_col = column("conversation_id")?;
    let text_col = column("text")?;

    let mut segments = Vec::new();
    for (row_no, row) in rows.enumerate() {
        let field = |col: usize| {
            row.get(col).cloned().ok_or_else(|| {
                PipelineError::InvalidInput(format!(
                    "row {}: {} fields, expected at least {}",
                    row_no + 2,
                    row.len(),
                    col + 1
                ))
            })
        };
        let id: i64 = field(id_col)?.trim().parse().map_err(|_| {
            PipelineError::InvalidInput(format!("row {}: non-integer segment id", row_no + 2))
        })?;
        segments.push(Segment {
            id,
            conversation: field(conv_col)?,
            text: field(text_col)?,
        });
    }

    segments.sort_by_key(|s| s.id);
    Ok(segments)
}
