//! Escalation strategies — how a pronoun-bearing segment is re-resolved
//!
//! Three interchangeable context strategies share one pipeline skeleton.
//! Each receives the current segment text, the base extraction output,
//! and a context view over already-visited segments, and produces the
//! segment's final raw output. Exactly one escalation attempt is made;
//! the result is final and is not re-gated.

use super::prompts;
use super::RunContext;
use crate::oracle::{Oracle, OracleResult};
use async_trait::async_trait;
use tracing::info;

/// One escalation attempt for a segment whose base facts hold pronouns.
///
/// When no context items are available the oracle is still invoked with
/// an explicit empty-context marker in the prompt — a degraded call
/// expected to behave like base extraction, not an error.
#[async_trait]
pub trait EscalationStrategy: Send + Sync {
    /// Stable identifier, used in progress reporting.
    fn id(&self) -> &str;

    /// Produce the segment's final raw output.
    async fn escalate(
        &self,
        oracle: &dyn Oracle,
        text: &str,
        base_output: &str,
        context: &RunContext<'_>,
    ) -> OracleResult<String>;
}

/// Rewrite the segment text against prior raw texts, then re-run base
/// extraction on the rewrite. An empty rewrite falls back to the
/// unescalated base output.
pub struct RewriteThenReextract;

#[async_trait]
impl EscalationStrategy for RewriteThenReextract {
    fn id(&self) -> &str {
        "rewrite-then-reextract"
    }

    async fn escalate(
        &self,
        oracle: &dyn Oracle,
        text: &str,
        base_output: &str,
        context: &RunContext<'_>,
    ) -> OracleResult<String> {
        let prior = context.prior_texts();
        let rewritten = oracle.generate(&prompts::rewrite(text, &prior)).await?;

        if rewritten.trim().is_empty() {
            info!("rewrite came back empty, keeping base extraction output");
            return Ok(base_output.to_string());
        }

        oracle.generate(&prompts::base_extraction(&rewritten)).await
    }
}

/// One extraction call with prior raw texts inlined into the prompt.
pub struct ContextInPrompt;

#[async_trait]
impl EscalationStrategy for ContextInPrompt {
    fn id(&self) -> &str {
        "context-in-prompt"
    }

    async fn escalate(
        &self,
        oracle: &dyn Oracle,
        text: &str,
        _base_output: &str,
        context: &RunContext<'_>,
    ) -> OracleResult<String> {
        let prior = context.prior_texts();
        oracle
            .generate(&prompts::context_extraction(text, &prior))
            .await
    }
}

/// One extraction call grounded in facts accepted earlier this run,
/// rather than in prior prose.
pub struct FactGrounded;

#[async_trait]
impl EscalationStrategy for FactGrounded {
    fn id(&self) -> &str {
        "fact-grounded"
    }

    async fn escalate(
        &self,
        oracle: &dyn Oracle,
        text: &str,
        _base_output: &str,
        context: &RunContext<'_>,
    ) -> OracleResult<String> {
        let prior = context.prior_facts();
        oracle
            .generate(&prompts::fact_grounded_extraction(text, &prior))
            .await
    }
}
