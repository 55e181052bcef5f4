//! `GET /meet/get_token`: signed video-meeting token.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

pub async fn token(State(ctx): State<ApiContext>) -> Result<Json<Value>, ApiError> {
    let token = ctx.core.meet.sign()?;
    Ok(Json(json!({ "token": token })))
}
