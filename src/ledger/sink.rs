//! Output sink — append-only accepted and quarantine ledgers
//!
//! Two pipe-delimited files: accepted facts and quarantined lines. Each
//! header is written exactly once, only when the file does not exist at
//! open. Rows are flushed as written so an interrupted run leaves a
//! readable ledger for the next run's resume load.

use super::table::format_row;
use super::LedgerResult;
use crate::pipeline::segment::Segment;
use crate::triple::Fact;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Marker row recorded when a segment's final output was blank.
pub const EMPTY_OUTPUT_MARKER: &str = "(empty)";

const ACCEPTED_HEADER: &[&str] = &["segment_id", "conversation_id", "triplet"];
const QUARANTINE_HEADER: &[&str] = &["segment_id", "conversation_id", "bad_triplet"];

/// Append-only dual ledger for accepted facts and quarantined lines.
pub struct FactSink {
    accepted: BufWriter<File>,
    quarantine: BufWriter<File>,
}

impl FactSink {
    /// Open (or create) both ledgers in append mode.
    ///
    /// Parent directories are created as needed. Headers are written only
    /// for files that did not exist yet.
    pub fn open(
        accepted_path: impl AsRef<Path>,
        quarantine_path: impl AsRef<Path>,
    ) -> LedgerResult<Self> {
        Ok(Self {
            accepted: open_ledger(accepted_path.as_ref(), ACCEPTED_HEADER)?,
            quarantine: open_ledger(quarantine_path.as_ref(), QUARANTINE_HEADER)?,
        })
    }

    /// Append an accepted fact, keyed by its source segment.
    pub fn accept(&mut self, segment: &Segment, fact: &Fact) -> LedgerResult<()> {
        write_row(
            &mut self.accepted,
            segment,
            &fact.render(),
        )
    }

    /// Append a quarantined line, verbatim.
    pub fn quarantine(&mut self, segment: &Segment, raw: &str) -> LedgerResult<()> {
        write_row(&mut self.quarantine, segment, raw)
    }

    /// Quarantine a segment's whole raw output (or the empty marker)
    /// when no facts were accepted for it.
    pub fn quarantine_empty(&mut self, segment: &Segment, final_output: &str) -> LedgerResult<()> {
        let trimmed = final_output.trim();
        let recorded = if trimmed.is_empty() {
            EMPTY_OUTPUT_MARKER
        } else {
            trimmed
        };
        self.quarantine(segment, recorded)
    }
}

fn open_ledger(path: &Path, header: &[&str]) -> LedgerResult<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let existed = path.exists();
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    if !existed {
        writeln!(writer, "{}", format_row(header, '|'))?;
        writer.flush()?;
    }
    Ok(writer)
}

fn write_row(writer: &mut BufWriter<File>, segment: &Segment, value: &str) -> LedgerResult<()> {
    let id = segment.id.to_string();
    writeln!(
        writer,
        "{}",
        format_row(&[&id, &segment.conversation, value], '|')
    )?;
    writer.flush()?;
    Ok(())
}
