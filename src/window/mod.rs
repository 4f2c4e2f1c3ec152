//! Window resolver — pronoun resolution over arbitrarily long text
//!
//! Text too long for one oracle call is split into overlapping sentence
//! windows. Each window is resolved independently and in input order;
//! the trailing `overlap` sentences of a window seed the next so
//! cross-window references keep their antecedents in view. Stitching
//! drops each later window's leading `overlap` resolved sentences, so
//! every non-overlap sentence appears in the output exactly once.

pub mod sentence;

use crate::oracle::{Oracle, OracleResult};
use crate::pipeline::prompts;
use sentence::{RuleSplitter, SentenceSplitter};
use std::sync::Arc;
use tracing::debug;

/// Window bounds.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    /// Character budget per window.
    pub max_chars: usize,
    /// Trailing sentences carried into the next window.
    pub overlap: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            max_chars: 4000,
            overlap: 2,
        }
    }
}

/// Resolves pronouns over long free text via overlapping windows.
pub struct WindowResolver {
    oracle: Arc<dyn Oracle>,
    splitter: Arc<dyn SentenceSplitter>,
    config: WindowConfig,
}

impl WindowResolver {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self {
            oracle,
            splitter: Arc::new(RuleSplitter),
            config: WindowConfig::default(),
        }
    }

    pub fn with_config(mut self, config: WindowConfig) -> Self {
        self.config = config;
        self
    }

    /// Swap in a different sentence segmenter.
    pub fn with_splitter(mut self, splitter: Arc<dyn SentenceSplitter>) -> Self {
        self.splitter = splitter;
        self
    }

    /// The window texts this input would be processed in, in order.
    ///
    /// A single element means no splitting will happen.
    pub fn plan(&self, text: &str) -> Vec<String> {
        if text.len() <= self.config.max_chars {
            return vec![text.to_string()];
        }
        let sentences = self.splitter.split(text);
        pack_windows(&sentences, self.config.max_chars, self.config.overlap)
            .into_iter()
            .map(|w| w.join(" "))
            .collect()
    }

    /// Resolve pronouns across the whole input.
    ///
    /// Input under the character budget degrades to a single oracle call
    /// with no splitting.
    pub async fn resolve(&self, text: &str) -> OracleResult<String> {
        if text.len() <= self.config.max_chars {
            let resolved = self.oracle.generate(&prompts::resolve_window(text)).await?;
            return Ok(resolved.trim().to_string());
        }

        let windows = self.plan(text);
        debug!(windows = windows.len(), "input over budget, resolving in windows");

        let mut parts: Vec<String> = Vec::new();
        for (i, window_text) in windows.iter().enumerate() {
            debug!(window = i + 1, chars = window_text.len(), "resolving window");
            let resolved = self
                .oracle
                .generate(&prompts::resolve_window(window_text))
                .await?;

            let mut resolved_sentences = self.splitter.split(&resolved);
            if i > 0 && self.config.overlap > 0 {
                // the leading sentences re-state the previous window's tail
                resolved_sentences.drain(..self.config.overlap.min(resolved_sentences.len()));
            }
            parts.push(resolved_sentences.join(" "));
        }

        Ok(parts.join(" ").trim().to_string())
    }
}

/// Greedily pack sentences into windows under the character budget.
///
/// When a sentence would push the current non-empty window over budget,
/// the window closes and its last `overlap` sentences seed the next one,
/// order preserved. A single sentence over budget still gets a window of
/// its own.
fn pack_windows(sentences: &[String], max_chars: usize, overlap: usize) -> Vec<Vec<String>> {
    let mut windows: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut total = 0usize;

    for sentence in sentences {
        let added = sentence.len() + 1;
        if !current.is_empty() && total + added > max_chars {
            let closed = std::mem::take(&mut current);
            let seed_start = closed.len().saturating_sub(overlap);
            if overlap > 0 {
                current = closed[seed_start..].to_vec();
            }
            windows.push(closed);
            total = current.iter().map(|s| s.len() + 1).sum();
        }
        current.push(sentence.clone());
        total += added;
    }
    if !current.is_empty() {
        windows.push(current);
    }
    windows
}

/// Built-in example texts for manual runs — short passages whose
/// pronouns reach across sentence boundaries.
pub fn examples() -> Vec<&'static str> {
    vec![
        "Mary met John at the office. She thanked him for the report.",
        "The server crashed at midnight. It caused several services to fail.",
        "Liam bought a camera. He loved it immediately. The store promised he could return it within 30 days.",
        "The committee reviewed the proposal. They found it compelling. Then they sent it back with minor edits.",
        "Acme Robotics acquired Nova Labs. The company said it would keep its brand. Investors expected it to grow. They applauded the decision.",
        "Sara placed the vase on the table. It wobbled because the surface was uneven. She moved it to the shelf. That solved the problem.",
        "Michael emailed Karen about the contract. He told her that the client wanted changes. She forwarded it to the legal team. They reviewed it overnight. In the morning, they approved it.",
        "The startup built a chatbot for the airline. It handled thousands of messages. Passengers said they liked it. The airline measured higher satisfaction, and it attributed the rise to the bot. Engineers monitored it during the launch. They fixed a memory leak when it appeared.",
        "The city council met to discuss the budget. The chair opened the session and welcomed a journalist. She asked them about the deficit. They explained that it had grown after the storm. The journalist recorded the answer; she published it later. When readers saw it, they shared it widely. That helped the council justify the new tax.",
        "Olivia adopted a puppy from the shelter. It was nervous at first, but it followed her everywhere. She bought a crate, and it slept in it the first night. The neighbors met the puppy, and they offered toys. When Olivia took it to the vet, the veterinarian said it looked healthy. She gave it a vaccine and scheduled another visit. Olivia posted photos online, and they got dozens of comments. That encouraged her to keep training it every day.",
    ]
}
