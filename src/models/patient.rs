use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lenient_number;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub photo: Option<String>,
    pub token: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub allergies: Option<String>,
    pub other_conditions: Option<String>,
    pub medications: Option<String>,
    pub overview: Option<String>,
    pub doctors: Vec<Uuid>,
    pub visits: Vec<Uuid>,
    pub prescriptions: Vec<Uuid>,
    pub tests: Vec<Uuid>,
    pub requests: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Registration payload: identity plus the health profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PatientRegistration {
    pub name: Option<String>,
    pub email: Option<String>,
    pub photo: Option<String>,
    pub token: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub age: Option<u32>,
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub height: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub weight: Option<f64>,
    pub allergies: Option<String>,
    pub other_conditions: Option<String>,
    pub medications: Option<String>,
    pub overview: Option<String>,
}

impl PatientRegistration {
    /// True when no field carries a value. Blank strings count as absent.
    pub fn is_blank(&self) -> bool {
        let texts = [
            &self.name,
            &self.email,
            &self.photo,
            &self.token,
            &self.gender,
            &self.allergies,
            &self.other_conditions,
            &self.medications,
            &self.overview,
        ];
        texts
            .iter()
            .all(|t| t.as_deref().map_or(true, |s| s.trim().is_empty()))
            && self.age.is_none()
            && self.height.is_none()
            && self.weight.is_none()
    }

    pub fn into_patient(self) -> Patient {
        Patient {
            id: Uuid::new_v4(),
            name: self.name,
            email: self.email,
            photo: self.photo,
            token: self.token,
            age: self.age,
            gender: self.gender,
            height: self.height,
            weight: self.weight,
            allergies: self.allergies,
            other_conditions: self.other_conditions,
            medications: self.medications,
            overview: self.overview,
            doctors: Vec::new(),
            visits: Vec::new(),
            prescriptions: Vec::new(),
            tests: Vec::new(),
            requests: Vec::new(),
            created_at: Utc::now(),
        }
    }
}
