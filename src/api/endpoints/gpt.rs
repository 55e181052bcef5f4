//! `POST /gpt`: chat-completion passthrough.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::enrichment::llm::{ChatMessage, ChatRequest};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GptRequest {
    pub messages: Vec<ChatMessage>,
}

/// Returns the provider's response body unchanged.
pub async fn complete(
    State(ctx): State<ApiContext>,
    body: Result<Json<GptRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    let response = ctx.core.chat.complete(&ChatRequest::new(body.messages)).await?;
    Ok(Json(response))
}
