//! Extraction pipeline — ordered, resumable segment traversal
//!
//! One segment at a time, strictly ascending by id: base extraction,
//! pronoun gate, at most one escalation, validation, ledger writes. The
//! ordering is load-bearing — the context bundle for a segment is drawn
//! from already-visited segments, so nothing here runs concurrently.
//! The resume check happens before any oracle call for a segment, which
//! gives at-least-once semantics across crashes without duplicate rows.

pub mod prompts;
pub mod segment;
pub mod strategy;

use crate::ledger::sink::FactSink;
use crate::ledger::{LedgerError, ProcessedSet};
use crate::oracle::{Oracle, OracleError};
use crate::triple::pronoun::output_needs_escalation;
use crate::triple::Fact;
use segment::Segment;
use std::collections::HashMap;
use std::sync::Arc;
use strategy::EscalationStrategy;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A failed oracle call aborts the run; the resume ledger makes the
    /// rerun safe.
    #[error("oracle call failed: {0}")]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("invalid segment table: {0}")]
    InvalidInput(String),
}

/// Tunables for one run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum prior items in a context bundle (k).
    pub context_window: usize,
    /// Skip all segments below this id, for partial reruns.
    pub min_segment_id: Option<i64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            context_window: 2,
            min_segment_id: None,
        }
    }
}

/// What one run did, for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Segments fully processed this run
    pub processed: usize,
    /// Segments skipped because the resume ledger already held them
    pub skipped: usize,
    /// Segments below the configured minimum id
    pub filtered: usize,
    /// Segments that went through escalation
    pub escalated: usize,
    /// Fact rows appended to the accepted ledger
    pub accepted: usize,
    /// Rows appended to the quarantine ledger
    pub quarantined: usize,
}

/// View over the run state a strategy may draw context from.
///
/// Context is bounded: at most k items, only from strictly-preceding
/// segments of the same conversation, oldest to newest.
pub struct RunContext<'a> {
    segments: &'a [Segment],
    index: usize,
    session_facts: &'a HashMap<i64, Vec<String>>,
    k: usize,
}

impl<'a> RunContext<'a> {
    pub fn new(
        segments: &'a [Segment],
        index: usize,
        session_facts: &'a HashMap<i64, Vec<String>>,
        k: usize,
    ) -> Self {
        Self {
            segments,
            index,
            session_facts,
            k,
        }
    }

    /// Indices of the ≤ k nearest strictly-preceding same-conversation
    /// segments, in ascending id order.
    fn prior_indices(&self) -> Vec<usize> {
        let conversation = &self.segments[self.index].conversation;
        let mut indices = Vec::new();
        let mut j = self.index;
        while j > 0 && indices.len() < self.k {
            j -= 1;
            if &self.segments[j].conversation == conversation {
                indices.insert(0, j);
            }
        }
        indices
    }

    /// Raw texts of the prior segments, chronological.
    pub fn prior_texts(&self) -> Vec<String> {
        self.prior_indices()
            .into_iter()
            .map(|i| self.segments[i].text.clone())
            .collect()
    }

    /// Facts accepted from the prior segments during this run,
    /// chronological. Only the in-run cache is consulted, never the
    /// persisted ledger.
    pub fn prior_facts(&self) -> Vec<String> {
        let mut facts = Vec::new();
        for i in self.prior_indices() {
            if let Some(lines) = self.session_facts.get(&self.segments[i].id) {
                facts.extend(lines.iter().cloned());
            }
        }
        facts
    }
}

/// The extraction pipeline, generic over oracle and strategy.
pub struct ExtractionPipeline {
    oracle: Arc<dyn Oracle>,
    strategy: Arc<dyn EscalationStrategy>,
    config: PipelineConfig,
}

impl ExtractionPipeline {
    pub fn new(oracle: Arc<dyn Oracle>, strategy: Arc<dyn EscalationStrategy>) -> Self {
        Self {
            oracle,
            strategy,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Traverse the segment sequence once.
    ///
    /// `segments` must already be sorted ascending by id (the loader
    /// guarantees this). Each segment completes fully — extraction,
    /// gate, optional escalation, validation, writes — before the next
    /// begins.
    pub async fn run(
        &self,
        segments: &[Segment],
        sink: &mut FactSink,
        resume: &mut dyn ProcessedSet,
    ) -> Result<RunSummary, PipelineError> {
        let mut session_facts: HashMap<i64, Vec<String>> = HashMap::new();
        let mut summary = RunSummary::default();

        for (index, seg) in segments.iter().enumerate() {
            if let Some(min) = self.config.min_segment_id {
                if seg.id < min {
                    debug!(segment = seg.id, min, "below minimum id, skipping");
                    summary.filtered += 1;
                    continue;
                }
            }
            if resume.contains(seg.id) {
                info!(segment = seg.id, "already committed, skipping");
                summary.skipped += 1;
                continue;
            }

            info!(segment = seg.id, conversation = %seg.conversation, "base extraction");
            let base_output = self
                .oracle
                .generate(&prompts::base_extraction(&seg.text))
                .await?;

            let final_output = if !base_output.is_empty()
                && output_needs_escalation(&base_output)
            {
                summary.escalated += 1;
                let context =
                    RunContext::new(segments, index, &session_facts, self.config.context_window);
                let prior = context.prior_indices().len();
                if prior > 0 {
                    info!(
                        segment = seg.id,
                        strategy = self.strategy.id(),
                        prior,
                        "pronoun detected, escalating with prior context"
                    );
                } else {
                    info!(
                        segment = seg.id,
                        strategy = self.strategy.id(),
                        "pronoun detected, escalating without prior context"
                    );
                }
                self.strategy
                    .escalate(&*self.oracle, &seg.text, &base_output, &context)
                    .await?
            } else {
                base_output
            };

            let mut accepted_here: Vec<String> = Vec::new();
            for line in final_output.lines() {
                match Fact::parse_line(line) {
                    Some(fact) => {
                        sink.accept(seg, &fact)?;
                        accepted_here.push(fact.render());
                        summary.accepted += 1;
                    }
                    None => {
                        warn!(segment = seg.id, line = line.trim(), "quarantined malformed line");
                        sink.quarantine(seg, line.trim())?;
                        summary.quarantined += 1;
                    }
                }
            }

            if accepted_here.is_empty() {
                // never drop a segment without a trace
                warn!(segment = seg.id, "no facts accepted, recording raw output");
                sink.quarantine_empty(seg, &final_output)?;
                summary.quarantined += 1;
            } else {
                session_facts.insert(seg.id, accepted_here);
            }

            resume.insert(seg.id);
            summary.processed += 1;
        }

        Ok(summary)
    }
}
