//! Chat-completion client (OpenAI-compatible API).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Model used for summaries and the chat passthrough.
pub const CHAT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Chat provider unreachable: {0}")]
    Unreachable(String),
    #[error("Chat provider returned error (status {status}): {body}")]
    Provider { status: u16, body: String },
    #[error("Malformed chat response: {0}")]
    Malformed(String),
}

/// One chat message. `content` may be a string or an array of parts, and
/// fields such as `name` or `tool_call_id` are forwarded untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: Value::String(content.into()),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            model: CHAT_MODEL.to_string(),
            messages,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run a chat completion and return the provider's raw JSON response.
    async fn complete(&self, request: &ChatRequest) -> Result<Value, ChatError>;
}

/// `choices[0].message.content` of a chat-completion response.
pub fn first_choice_content(response: &Value) -> Result<String, ChatError> {
    response
        .pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| ChatError::Malformed("missing choices[0].message.content".into()))
}

pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, request: &ChatRequest) -> Result<Value, ChatError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ChatError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ChatError::Malformed(e.to_string()))
    }
}

/// Chat model that answers every request with a fixed reply.
pub struct MockChatModel {
    reply: Option<String>,
}

impl MockChatModel {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { reply: None }
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn complete(&self, request: &ChatRequest) -> Result<Value, ChatError> {
        let reply = self.reply.as_ref().ok_or_else(|| ChatError::Provider {
            status: 503,
            body: "mock outage".into(),
        })?;
        Ok(serde_json::json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "model": request.model,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": reply},
                "finish_reason": "stop"
            }]
        }))
    }
}
