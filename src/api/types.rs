//! Shared types for the HTTP layer.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::core_state::CoreState;
use crate::models::Role;

/// Status for requests that were processed but not applied
/// (already requested, newly created doctor, needs registration, ...).
pub const SOFT_FAIL_CODE: u16 = 212;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

// ═══════════════════════════════════════════════════════════
// Request bodies shared by several resources
// ═══════════════════════════════════════════════════════════

/// `POST /doctors/login` and `POST /patients/login`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginRequest {
    pub google_access_token: Option<String>,
    pub role: Option<Role>,
}

/// `?id=` lookups.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

// ═══════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════

/// Non-blank value of an optional text field.
pub fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a required id, reporting `missing` when absent and `NotFound`
/// when it cannot name any record.
pub fn require_id(raw: Option<&str>, missing: &str, entity: &str) -> Result<Uuid, ApiError> {
    let raw = present(raw).ok_or_else(|| ApiError::BadRequest(missing.to_string()))?;
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(format!("{entity} not found")))
}

pub fn soft_fail_status() -> StatusCode {
    StatusCode::from_u16(SOFT_FAIL_CODE).unwrap_or(StatusCode::OK)
}

/// JSON body with a numeric `status` mirrored in the payload.
pub fn status_json(status: StatusCode, mut body: Value) -> Response {
    if let Some(map) = body.as_object_mut() {
        map.insert("status".into(), json!(status.as_u16()));
    }
    (status, Json(body)).into_response()
}

/// `212 {"message": ..., "status": 212}`
pub fn soft_fail(message: &str) -> Response {
    status_json(soft_fail_status(), json!({ "message": message }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn soft_fail_carries_212_in_status_and_body() {
        let response = soft_fail("Already Requested");
        assert_eq!(response.status().as_u16(), 212);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({"message": "Already Requested", "status": 212}));
    }

    #[test]
    fn require_id_distinguishes_missing_and_malformed() {
        let missing = require_id(Some("  "), "No patient id provided", "Patient").unwrap_err();
        assert!(matches!(missing, ApiError::BadRequest(m) if m == "No patient id provided"));
        let malformed = require_id(Some("64f1c0ffee"), "x", "Patient").unwrap_err();
        assert!(matches!(malformed, ApiError::NotFound(_)));
        let id = Uuid::new_v4();
        assert_eq!(require_id(Some(&id.to_string()), "x", "Patient").unwrap(), id);
    }

    #[test]
    fn login_request_rejects_unknown_fields() {
        let ok: LoginRequest =
            serde_json::from_str(r#"{"googleAccessToken":"t","role":"doctor"}"#).unwrap();
        assert_eq!(ok.google_access_token.as_deref(), Some("t"));
        assert_eq!(ok.role, Some(Role::Doctor));
        assert!(serde_json::from_str::<LoginRequest>(r#"{"token":"t"}"#).is_err());
        assert!(serde_json::from_str::<LoginRequest>(r#"{"role":"nurse"}"#).is_err());
    }
}
