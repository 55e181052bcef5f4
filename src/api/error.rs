//! API error types with structured JSON responses.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::db::DatabaseError;
use crate::enrichment::llm::ChatError;
use crate::identity::IdentityError;
use crate::meet::MeetError;
use crate::payment::PaymentError;
use crate::submission::SubmissionError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
///
/// Absent records are reported as 400 like every other rejected request;
/// only unmatched routes produce 404.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid access token")]
    InvalidCredentials,
    #[error("Upstream failure: {0}")]
    Upstream(String),
    /// Third-party service failure on a passthrough endpoint. Rendered as
    /// `{"error": message}`; `detail` is logged only.
    #[error("{message}: {detail}")]
    ServiceFailure {
        message: &'static str,
        detail: String,
    },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail),
            ApiError::NotFound(detail) => (StatusCode::BAD_REQUEST, "NOT_FOUND", detail),
            ApiError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                "INVALID_TOKEN",
                "Invalid access token".to_string(),
            ),
            ApiError::Upstream(detail) => {
                tracing::warn!(%detail, "Upstream call failed");
                (
                    StatusCode::BAD_REQUEST,
                    "UPSTREAM",
                    "Something Went Wrong!".to_string(),
                )
            }
            ApiError::ServiceFailure { message, detail } => {
                tracing::error!(%detail, failure = message, "External service failure");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": message })),
                )
                    .into_response();
            }
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            status: status.as_u16(),
            code,
            message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, id } => {
                ApiError::NotFound(format!("{entity_type} not found: {id}"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidToken(detail) => {
                tracing::warn!(%detail, "Access token rejected");
                ApiError::InvalidCredentials
            }
            IdentityError::EmptyRegistration => {
                ApiError::BadRequest("Registration data is empty".into())
            }
            IdentityError::Database(e) => e.into(),
        }
    }
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::PatientNotFound(_) => ApiError::NotFound("Patient not found".into()),
            SubmissionError::NoFiles => ApiError::BadRequest("No files provided".into()),
            SubmissionError::InvalidDate(raw) => ApiError::BadRequest(format!("Invalid date: {raw}")),
            SubmissionError::Enrichment(e) => ApiError::Upstream(e.to_string()),
            SubmissionError::Database(e) => e.into(),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        ApiError::ServiceFailure {
            message: "Failed to create payment intent",
            detail: err.to_string(),
        }
    }
}

impl From<MeetError> for ApiError {
    fn from(err: MeetError) -> Self {
        ApiError::ServiceFailure {
            message: "Failed to generate token",
            detail: err.to_string(),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        ApiError::ServiceFailure {
            message: "Failed to fetch chat completions",
            detail: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(format!("Malformed multipart body: {}", err.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn not_found_is_normalized_to_400() {
        let response = ApiError::NotFound("No Request Found".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["status"], 400);
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "No Request Found");
    }

    #[tokio::test]
    async fn invalid_credentials_returns_400() {
        let response = ApiError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Invalid access token");
    }

    #[tokio::test]
    async fn upstream_hides_provider_detail() {
        let response = ApiError::Upstream("cloudinary: 401 bad api key".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Something Went Wrong!");
    }

    #[tokio::test]
    async fn service_failure_uses_error_key() {
        let api_err: ApiError = ChatError::Unreachable("timeout".into()).into();
        let response = api_err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json, json!({"error": "Failed to fetch chat completions"}));
    }

    #[tokio::test]
    async fn internal_returns_500() {
        let response = ApiError::Internal("something broke".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        // Internal errors hide details from client
        assert_eq!(json["message"], "An internal error occurred");
    }

    #[test]
    fn database_not_found_maps_to_not_found() {
        let api_err: ApiError = DatabaseError::not_found("doctor", "abc").into();
        assert!(matches!(api_err, ApiError::NotFound(_)));
        let api_err: ApiError = DatabaseError::LockPoisoned.into();
        assert!(matches!(api_err, ApiError::Internal(_)));
    }

    #[test]
    fn submission_errors_map_by_kind() {
        let no_files: ApiError = SubmissionError::NoFiles.into();
        assert!(matches!(no_files, ApiError::BadRequest(m) if m == "No files provided"));
        let upstream: ApiError = SubmissionError::Enrichment(
            crate::enrichment::EnrichmentError::OcrFailed("x".into()),
        )
        .into();
        assert!(matches!(upstream, ApiError::Upstream(_)));
    }
}
