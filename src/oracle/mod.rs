//! Extraction oracle — the text-generation collaborator
//!
//! The pipeline treats text generation as a pure, blocking, fallible
//! function from prompt to raw text. Two implementations:
//! - `HttpOracle`: posts to a chat-completions endpoint (production)
//! - `MockOracle`: scripted responses matched by prompt substring (testing)
//!
//! The trait is injected wherever generation is needed so the pipeline
//! and the window resolver stay testable without a live service.

pub mod http;

pub use http::HttpOracle;

use async_trait::async_trait;
use std::sync::Mutex;
use thiserror::Error;

/// Errors from oracle calls.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle transport error: {0}")]
    Transport(String),

    #[error("oracle returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("oracle response malformed: {0}")]
    Malformed(String),

    #[error("no scripted response for prompt: {0}")]
    Unscripted(String),
}

/// Result type for oracle calls.
pub type OracleResult<T> = Result<T, OracleError>;

/// The single operation the pipeline needs from a text generator.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Generate raw text from a prompt.
    async fn generate(&self, prompt: &str) -> OracleResult<String>;
}

/// One scripted behavior: respond with text, or fail.
enum Scripted {
    Respond(String),
    Fail,
}

/// Mock oracle for tests — responses matched by prompt substring.
///
/// Rules are checked in registration order; the first needle found in
/// the prompt wins. An optional default catches everything else. Every
/// prompt is recorded so tests can assert how many calls were made and
/// what they contained.
pub struct MockOracle {
    rules: Vec<(String, Scripted)>,
    default: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl MockOracle {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            default: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Respond with `response` to any prompt containing `needle`.
    pub fn with_response(mut self, needle: impl Into<String>, response: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Scripted::Respond(response.into())));
        self
    }

    /// Fail any prompt containing `needle`.
    pub fn with_failure(mut self, needle: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Scripted::Fail));
        self
    }

    /// Respond with `response` to prompts no rule matches.
    pub fn with_default(mut self, response: impl Into<String>) -> Self {
        self.default = Some(response.into());
        self
    }

    /// How many calls this oracle has served.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().expect("mock prompt log poisoned").len()
    }

    /// Every prompt received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("mock prompt log poisoned").clone()
    }
}

#[async_trait]
impl Oracle for MockOracle {
    async fn generate(&self, prompt: &str) -> OracleResult<String> {
        self.prompts
            .lock()
            .expect("mock prompt log poisoned")
            .push(prompt.to_string());

        for (needle, scripted) in &self.rules {
            if prompt.contains(needle.as_str()) {
                return match scripted {
                    Scripted::Respond(text) => Ok(text.clone()),
                    Scripted::Fail => Err(OracleError::Transport(format!(
                        "scripted failure for needle '{}'",
                        needle
                    ))),
                };
            }
        }

        match &self.default {
            Some(text) => Ok(text.clone()),
            None => Err(OracleError::Unscripted(
                prompt.chars().take(80).collect(),
            )),
        }
    }
}
