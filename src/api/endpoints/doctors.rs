//! Doctor endpoints.
//!
//! - `POST /doctors/login`: resolve or create the doctor
//! - `GET /doctors/patients?id=`: doctor with patients and requests expanded
//! - `POST /doctors/accept`: accept a pending connection request

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::api::error::ApiError;
use crate::api::types::{require_id, soft_fail_status, status_json, ApiContext, IdQuery, LoginRequest};
use crate::api::views::DoctorView;
use crate::connection::{self, AcceptOutcome};
use crate::db::{self, DatabaseError};
use crate::identity::{self, DoctorLogin};

/// `POST /doctors/login`: 200 existing, 212 created on first sight.
pub async fn login(
    State(ctx): State<ApiContext>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let token = body.google_access_token.ok_or(ApiError::InvalidCredentials)?;

    let outcome = identity::login_doctor(&ctx.core.store, ctx.core.identity.as_ref(), &token).await?;
    Ok(match outcome {
        DoctorLogin::Found(doctor) => status_json(StatusCode::OK, json!({ "foundDoctor": doctor })),
        DoctorLogin::Created(doctor) => status_json(soft_fail_status(), json!({ "doctor": doctor })),
    })
}

/// `GET /doctors/patients?id=`
pub async fn patients(
    State(ctx): State<ApiContext>,
    Query(query): Query<IdQuery>,
) -> Result<Json<DoctorView>, ApiError> {
    let id = require_id(query.id.as_deref(), "No doctor id provided", "Doctor")?;

    let view = ctx.core.store.read(|conn| {
        let doctor = db::get_doctor(conn, &id)?.ok_or_else(|| DatabaseError::not_found("doctor", id))?;
        let patients = db::get_patients(conn, &doctor.patients)?;
        let requests = db::get_requests(conn, &doctor.requests)?;
        Ok::<_, DatabaseError>(DoctorView::new(doctor, patients, requests))
    })?;
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AcceptRequest {
    pub id: Option<String>,
}

/// `POST /doctors/accept`
pub async fn accept(
    State(ctx): State<ApiContext>,
    body: Result<Json<AcceptRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let id = require_id(body.id.as_deref(), "No Request Id Found", "Request")
        .map_err(|e| match e {
            ApiError::NotFound(_) => ApiError::NotFound("No Request Found".into()),
            other => other,
        })?;

    match connection::accept_request(&ctx.core.store, &id)? {
        AcceptOutcome::Accepted { .. } => Ok((StatusCode::OK, Json("Request Accepted")).into_response()),
        AcceptOutcome::NotFound => Err(ApiError::NotFound("No Request Found".into())),
        AcceptOutcome::AlreadyAccepted => Err(ApiError::BadRequest("Already Accepted".into())),
    }
}
