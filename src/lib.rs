//! Anaphora: resumable fact extraction with pronoun-resolution escalation
//!
//! Extracts subject-relation-object facts from ordered, conversation-grouped
//! text segments. Segments whose base extraction carries pronouns in subject
//! or object position are escalated once through a configurable context
//! strategy before their facts are committed. Output lands in append-only
//! accepted and quarantine ledgers; a run can be interrupted and resumed
//! without duplicate rows.
//!
//! # Core pieces
//!
//! - **Pipeline**: strictly sequential segment traversal with a resume check
//!   before any oracle call
//! - **Strategies**: rewrite-then-reextract, context-in-prompt, fact-grounded
//! - **Window resolver**: pronoun resolution over long free text via
//!   overlapping sentence windows
//!
//! # Example
//!
//! ```no_run
//! use anaphora::{ExtractionPipeline, MockOracle, RewriteThenReextract};
//! use std::sync::Arc;
//!
//! let oracle = Arc::new(MockOracle::new().with_default(""));
//! let pipeline = ExtractionPipeline::new(oracle, Arc::new(RewriteThenReextract));
//! // pipeline.run(...) drives segments through extraction and escalation
//! ```

pub mod ledger;
pub mod oracle;
pub mod pipeline;
pub mod triple;
pub mod window;

pub use ledger::sink::FactSink;
pub use ledger::{load_resume_set, InMemorySet, LedgerError, ProcessedSet};
pub use oracle::{HttpOracle, MockOracle, Oracle, OracleError};
pub use pipeline::segment::{load_segments, Segment};
pub use pipeline::strategy::{
    ContextInPrompt, EscalationStrategy, FactGrounded, RewriteThenReextract,
};
pub use pipeline::{ExtractionPipeline, PipelineConfig, PipelineError, RunSummary};
pub use triple::Fact;
pub use window::{WindowConfig, WindowResolver};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
