//! Patient endpoints: login, registration, history views, document
//! submission forms and doctor connection requests.

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::form::MultipartForm;
use crate::api::types::{
    present, require_id, soft_fail, soft_fail_status, status_json, ApiContext, IdQuery, LoginRequest,
};
use crate::api::views::PatientView;
use crate::connection::{self, RequestOutcome};
use crate::db::{self, DatabaseError};
use crate::identity::{self, PatientLogin};
use crate::models::{Patient, PatientRegistration, Prescription, TestRecord, Visit};
use crate::submission::{self, PrescriptionForm, SubmissionForm, TestForm, VisitForm};

// ═══════════════════════════════════════════════════════════
// Identity
// ═══════════════════════════════════════════════════════════

/// `POST /patients/login`: 200 existing, 212 needs registration.
pub async fn login(
    State(ctx): State<ApiContext>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let token = body.google_access_token.ok_or(ApiError::InvalidCredentials)?;

    let outcome = identity::login_patient(&ctx.core.store, ctx.core.identity.as_ref(), &token).await?;
    Ok(match outcome {
        PatientLogin::Found(patient) => status_json(StatusCode::OK, json!({ "foundPatient": patient })),
        PatientLogin::NeedsRegistration {
            name,
            email,
            photo,
            token,
        } => status_json(
            soft_fail_status(),
            json!({
                "name": name,
                "email": email,
                "photo": photo,
                "token": token,
                "role": body.role,
            }),
        ),
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub data: Option<PatientRegistration>,
}

/// `POST /patients/register`
pub async fn register(
    State(ctx): State<ApiContext>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let registration = body
        .data
        .ok_or_else(|| ApiError::BadRequest("Registration data is empty".into()))?;
    let patient = identity::register_patient(&ctx.core.store, registration)?;
    Ok(status_json(
        StatusCode::OK,
        json!({ "message": "Registered Successfully", "patient": patient }),
    ))
}

// ═══════════════════════════════════════════════════════════
// History views
// ═══════════════════════════════════════════════════════════

fn load_patient(ctx: &ApiContext, query: &IdQuery) -> Result<Patient, ApiError> {
    let id = require_id(query.id.as_deref(), "No patient id provided", "Patient")?;
    ctx.core
        .store
        .read(|conn| db::get_patient(conn, &id))?
        .ok_or_else(|| ApiError::NotFound("Patient not found".into()))
}

/// `GET /patients/healthHistory?id=`: visits and doctors expanded.
pub async fn health_history(
    State(ctx): State<ApiContext>,
    Query(query): Query<IdQuery>,
) -> Result<Json<PatientView>, ApiError> {
    let patient = load_patient(&ctx, &query)?;
    let (visits, doctors) = ctx.core.store.read(|conn| {
        Ok::<_, DatabaseError>((
            db::get_visits(conn, &patient.visits)?,
            db::get_doctors(conn, &patient.doctors)?,
        ))
    })?;
    Ok(Json(PatientView::from(patient).with_visits(visits).with_doctors(doctors)))
}

/// `GET /patients/prescription?id=`
pub async fn prescriptions(
    State(ctx): State<ApiContext>,
    Query(query): Query<IdQuery>,
) -> Result<Json<PatientView>, ApiError> {
    let patient = load_patient(&ctx, &query)?;
    let prescriptions = ctx
        .core
        .store
        .read(|conn| db::get_prescriptions(conn, &patient.prescriptions))?;
    Ok(Json(PatientView::from(patient).with_prescriptions(prescriptions)))
}

/// `GET /patients/test?id=`
pub async fn tests(
    State(ctx): State<ApiContext>,
    Query(query): Query<IdQuery>,
) -> Result<Json<PatientView>, ApiError> {
    let patient = load_patient(&ctx, &query)?;
    let tests = ctx.core.store.read(|conn| db::get_tests(conn, &patient.tests))?;
    Ok(Json(PatientView::from(patient).with_tests(tests)))
}

/// `GET /patients/visits?id=`: a single visit by its own id.
pub async fn visit(
    State(ctx): State<ApiContext>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Visit>, ApiError> {
    let id = require_id(query.id.as_deref(), "No visit id provided", "Visit")?;
    ctx.core
        .store
        .read(|conn| db::get_visit(conn, &id))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Visit not found".into()))
}

// ═══════════════════════════════════════════════════════════
// Submission forms
// ═══════════════════════════════════════════════════════════

async fn submit_form<F>(
    ctx: &ApiContext,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<F::Record, ApiError>
where
    F: SubmissionForm + serde::de::DeserializeOwned,
{
    let mut form = MultipartForm::read(multipart?).await?;
    let patient_id: Uuid = form.take_patient_id()?;
    let files = std::mem::take(&mut form.files);
    let fields: F = form.parse()?;

    let record = submission::submit(
        &ctx.core.store,
        &ctx.core.enricher,
        &patient_id,
        fields,
        &files,
    )
    .await?;
    Ok(record)
}

/// `POST /patients/healthHistoryForm`: new visit, files stored without OCR.
pub async fn health_history_form(
    State(ctx): State<ApiContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Visit>, ApiError> {
    submit_form::<VisitForm>(&ctx, multipart).await.map(Json)
}

/// `POST /patients/prescription-form`: images are OCR'd and summarized.
pub async fn prescription_form(
    State(ctx): State<ApiContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Prescription>, ApiError> {
    submit_form::<PrescriptionForm>(&ctx, multipart).await.map(Json)
}

/// `POST /patients/test-form`
pub async fn test_form(
    State(ctx): State<ApiContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TestRecord>, ApiError> {
    submit_form::<TestForm>(&ctx, multipart).await.map(Json)
}

// ═══════════════════════════════════════════════════════════
// Connection requests
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RequestDoctorBody {
    pub id: Option<String>,
    pub doctor_email: Option<String>,
}

/// `POST /patients/request-doctor`: every rejection is a 212 soft-fail.
pub async fn request_doctor(
    State(ctx): State<ApiContext>,
    body: Result<Json<RequestDoctorBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let Some(raw_id) = present(body.id.as_deref()) else {
        return Ok(soft_fail("No patient id provided"));
    };
    let Ok(patient_id) = Uuid::parse_str(raw_id) else {
        return Ok(soft_fail("Patient Not Found"));
    };
    let email = body.doctor_email.unwrap_or_default();

    Ok(match connection::request_doctor(&ctx.core.store, &patient_id, &email)? {
        RequestOutcome::Created(request) => status_json(StatusCode::OK, json!({ "request": request })),
        RequestOutcome::PatientNotFound => soft_fail("Patient Not Found"),
        RequestOutcome::DoctorNotFound => soft_fail("Doctor Not Found"),
        RequestOutcome::AlreadyRequested => soft_fail("Already Requested"),
        RequestOutcome::AlreadyPatient => soft_fail("Already a Patient"),
    })
}
