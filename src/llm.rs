//! Chat-completion client for the generative phases.
//!
//! Speaks the OpenAI chat-completions wire format, which OpenRouter and
//! compatible backends expose at `/chat/completions`. The pipeline only
//! needs whole responses, so the client is non-streaming; the full raw
//! body is kept for the audit trail.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{BriefError, Result};

/// One chat message in a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `system`, `user`, or `assistant`.
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Build a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    /// Build a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// A chat-completion request in OpenAI wire shape.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation messages, system first.
    pub messages: Vec<ChatMessage>,
    /// Completion token budget.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling parameter.
    pub top_p: f32,
    /// Seed, omitted from the wire when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// A completed generative call: the assistant text plus the full raw
/// response body for auditing.
#[derive(Debug, Clone)]
pub struct ChatCompletion {
    /// Assistant message content.
    pub content: String,
    /// The backend's complete response body.
    pub raw: serde_json::Value,
}

/// Seam over the chat backend so phases can run against the real API, a
/// stub, or scripted test doubles.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Run one chat completion.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion>;

    /// Provider identifier recorded in audit snapshots.
    fn provider(&self) -> &str;
}

/// HTTP client for an OpenAI-compatible chat-completions endpoint.
pub struct HttpChatClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpChatClient {
    /// Create a client for `base_url` (including the version prefix,
    /// e.g. `https://openrouter.ai/api/v1`).
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| BriefError::Llm(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client,
        })
    }
}

#[async_trait]
impl ChatClient for HttpChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        let base = self.base_url.trim_end_matches('/');
        let url = format!("{base}/chat/completions");

        let mut http_request = self.client.post(&url).json(request);
        if !self.api_key.is_empty() {
            http_request = http_request.bearer_auth(&self.api_key);
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| BriefError::Llm(format!("chat request failed: {e}")))?
            .error_for_status()
            .map_err(|e| BriefError::Llm(format!("chat HTTP error: {e}")))?;

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BriefError::Llm(format!("chat response not JSON: {e}")))?;

        let content = extract_content(&raw)?;
        Ok(ChatCompletion { content, raw })
    }

    fn provider(&self) -> &str {
        "openrouter"
    }
}

/// Extract the assistant text from a chat-completions response body.
fn extract_content(raw: &serde_json::Value) -> Result<String> {
    raw.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .map(str::to_string)
        .ok_or_else(|| BriefError::Llm("response missing choices[0].message.content".into()))
}

/// Deterministic canned client for `--stub` runs and tests.
pub struct StubChatClient;

#[async_trait]
impl ChatClient for StubChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        let content = format!("(stub response from {})", request.model);
        let raw = serde_json::json!({
            "id": "resp_stub",
            "choices": [{
                "message": { "role": "assistant", "content": content.clone() },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 0, "completion_tokens": 0 }
        });
        Ok(ChatCompletion { content, raw })
    }

    fn provider(&self) -> &str {
        "stub"
    }
}
