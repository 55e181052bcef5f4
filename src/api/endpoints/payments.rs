//! `POST /payments/create_payment_intent`: fixed consultation fee.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::payment::{CONSULTATION_AMOUNT, CONSULTATION_CURRENCY};

pub async fn create_intent(State(ctx): State<ApiContext>) -> Result<Json<Value>, ApiError> {
    let intent = ctx
        .core
        .payments
        .create_intent(CONSULTATION_AMOUNT, CONSULTATION_CURRENCY)
        .await?;
    tracing::info!(intent_id = %intent.id, "Payment intent created");
    Ok(Json(json!({ "clientSecret": intent.client_secret })))
}
