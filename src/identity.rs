//! Identity resolution: OAuth access token → local Patient or Doctor.
//!
//! The provider is asked for the user's profile once per login. Doctors are
//! created on first sight; patients are not, they must register explicitly.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::db::{self, DatabaseError, Store};
use crate::models::{Doctor, Patient, PatientRegistration};

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Access token rejected: {0}")]
    InvalidToken(String),

    #[error("Registration carries no profile data")]
    EmptyRegistration,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Profile returned by the provider's userinfo endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserInfo {
    pub name: Option<String>,
    pub email: String,
    pub picture: Option<String>,
}

#[async_trait]
pub trait UserInfoProvider: Send + Sync {
    async fn user_info(&self, access_token: &str) -> Result<UserInfo, IdentityError>;
}

/// Google OAuth2 v3 userinfo client.
pub struct GoogleUserInfoClient {
    client: reqwest::Client,
    userinfo_url: String,
}

impl GoogleUserInfoClient {
    pub fn new(userinfo_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            userinfo_url: userinfo_url.to_string(),
        }
    }
}

#[async_trait]
impl UserInfoProvider for GoogleUserInfoClient {
    async fn user_info(&self, access_token: &str) -> Result<UserInfo, IdentityError> {
        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| IdentityError::InvalidToken(format!("userinfo unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::InvalidToken(format!(
                "userinfo returned {status}"
            )));
        }

        response
            .json::<UserInfo>()
            .await
            .map_err(|e| IdentityError::InvalidToken(format!("malformed userinfo: {e}")))
    }
}

/// Provider with a fixed token → profile table.
pub struct MockUserInfoProvider {
    users: Vec<(String, UserInfo)>,
}

impl MockUserInfoProvider {
    pub fn new() -> Self {
        Self { users: Vec::new() }
    }

    pub fn with_user(mut self, token: &str, name: &str, email: &str) -> Self {
        self.users.push((
            token.to_string(),
            UserInfo {
                name: Some(name.to_string()),
                email: email.to_string(),
                picture: Some(format!("https://photos.test/{name}.png")),
            },
        ));
        self
    }
}

impl Default for MockUserInfoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserInfoProvider for MockUserInfoProvider {
    async fn user_info(&self, access_token: &str) -> Result<UserInfo, IdentityError> {
        self.users
            .iter()
            .find(|(token, _)| token == access_token)
            .map(|(_, info)| info.clone())
            .ok_or_else(|| IdentityError::InvalidToken("unknown token".into()))
    }
}

// ═══════════════════════════════════════════
// Resolution
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum DoctorLogin {
    Found(Doctor),
    Created(Doctor),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatientLogin {
    Found(Patient),
    /// No local record yet. Carries the provider profile for the registration form.
    NeedsRegistration {
        name: Option<String>,
        email: String,
        photo: Option<String>,
        token: String,
    },
}

/// Resolve a doctor by provider email, creating the record on first login.
pub async fn login_doctor(
    store: &Store,
    provider: &dyn UserInfoProvider,
    access_token: &str,
) -> Result<DoctorLogin, IdentityError> {
    let info = provider.user_info(access_token).await?;

    // Lookup and create share one transaction so two first logins with the
    // same email cannot both insert.
    store.transaction(|tx| {
        if let Some(found) = db::get_doctor_by_email(tx, &info.email)? {
            return Ok(DoctorLogin::Found(found));
        }
        let doctor = Doctor::new(
            info.email.clone(),
            info.name.clone(),
            info.picture.clone(),
            Some(access_token.to_string()),
        );
        db::insert_doctor(tx, &doctor)?;
        tracing::info!(doctor_id = %doctor.id, "Doctor created on first login");
        Ok(DoctorLogin::Created(doctor))
    })
}

/// Resolve a patient by provider email. Never writes.
pub async fn login_patient(
    store: &Store,
    provider: &dyn UserInfoProvider,
    access_token: &str,
) -> Result<PatientLogin, IdentityError> {
    let info = provider.user_info(access_token).await?;

    let found = store.read(|conn| db::get_patient_by_email(conn, &info.email))?;
    Ok(match found {
        Some(patient) => PatientLogin::Found(patient),
        None => PatientLogin::NeedsRegistration {
            name: info.name,
            email: info.email,
            photo: info.picture,
            token: access_token.to_string(),
        },
    })
}

/// Create a patient from a registration form.
pub fn register_patient(store: &Store, registration: PatientRegistration) -> Result<Patient, IdentityError> {
    if registration.is_blank() {
        return Err(IdentityError::EmptyRegistration);
    }
    let patient = registration.into_patient();
    store.transaction(|tx| db::insert_patient(tx, &patient))?;
    tracing::info!(patient_id = %patient.id, "Patient registered");
    Ok(patient)
}
