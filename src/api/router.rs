//! HTTP router.
//!
//! Returns a composable `Router` with every resource mounted at its
//! top-level prefix. Layers (outermost → innermost):
//! CORS → nosniff header → access log → body limit → handler.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::docs;
use crate::api::endpoints::{doctors, gpt, home, meet, patients, payments};
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Upper bound for multipart submissions.
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Build the service router.
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    let doctor_routes = Router::new()
        .route("/login", post(doctors::login))
        .route("/patients", get(doctors::patients))
        .route("/accept", post(doctors::accept));

    let patient_routes = Router::new()
        .route("/login", post(patients::login))
        .route("/register", post(patients::register))
        .route("/healthHistory", get(patients::health_history))
        .route("/healthHistoryForm", post(patients::health_history_form))
        .route("/prescription", get(patients::prescriptions))
        .route("/prescription-form", post(patients::prescription_form))
        .route("/test", get(patients::tests))
        .route("/test-form", post(patients::test_form))
        .route("/visits", get(patients::visit))
        .route("/request-doctor", post(patients::request_doctor));

    Router::new()
        .route("/", get(home::index))
        .route("/gpt", post(gpt::complete))
        .route("/payments/create_payment_intent", post(payments::create_intent))
        .route("/meet/get_token", get(meet::token))
        .route("/api-docs", get(docs::swagger_ui))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        .nest("/doctors", doctor_routes)
        .nest("/patients", patient_routes)
        .fallback(page_not_found)
        .with_state(ctx)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(CorsLayer::permissive())
}

async fn page_not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Page Not Found")
}
