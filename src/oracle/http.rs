//! HTTP oracle — chat-completions client
//!
//! Posts the prompt as a single user message to an OpenAI-compatible
//! `/chat/completions` endpoint and returns the first choice's content.
//! The request timeout is the only bound on an in-flight call; the
//! pipeline itself imposes none.

use super::{Oracle, OracleError, OracleResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

/// Production oracle over HTTP.
pub struct HttpOracle {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl HttpOracle {
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: build_client(DEFAULT_TIMEOUT_SECS),
            url: url.into(),
            model: model.into(),
            api_key: None,
        }
    }

    /// Send the key as a bearer token on every request.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the whole-request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.client = build_client(secs);
        self
    }
}

fn build_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_default()
}

#[async_trait]
impl Oracle for HttpOracle {
    async fn generate(&self, prompt: &str) -> OracleResult<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Malformed(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| OracleError::Malformed("no choices in response".to_string()))?;

        Ok(content.trim().to_string())
    }
}
