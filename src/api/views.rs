//! Response views with reference lists expanded to full records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{ConnectionRequest, Doctor, Patient, Prescription, TestRecord, Visit};

/// A reference list, either as stored ids or expanded records.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RefList<T> {
    Ids(Vec<Uuid>),
    Records(Vec<T>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub photo: Option<String>,
    pub token: Option<String>,
    pub patients: Vec<Patient>,
    pub requests: Vec<ConnectionRequest>,
    pub created_at: DateTime<Utc>,
}

impl DoctorView {
    pub fn new(doctor: Doctor, patients: Vec<Patient>, requests: Vec<ConnectionRequest>) -> Self {
        Self {
            id: doctor.id,
            name: doctor.name,
            email: doctor.email,
            photo: doctor.photo,
            token: doctor.token,
            patients,
            requests,
            created_at: doctor.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientView {
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
    pub doctors: RefList<Doctor>,
    pub visits: RefList<Visit>,
    pub prescriptions: RefList<Prescription>,
    pub tests: RefList<TestRecord>,
    pub requests: RefList<ConnectionRequest>,
    pub created_at: DateTime<Utc>,
}

impl From<Patient> for PatientView {
    fn from(p: Patient) -> Self {
        Self {
            id: p.id,
            name: p.name,
            email: p.email,
            photo: p.photo,
            token: p.token,
            age: p.age,
            gender: p.gender,
            height: p.height,
            weight: p.weight,
            allergies: p.allergies,
            other_conditions: p.other_conditions,
            medications: p.medications,
            overview: p.overview,
            doctors: RefList::Ids(p.doctors),
            visits: RefList::Ids(p.visits),
            prescriptions: RefList::Ids(p.prescriptions),
            tests: RefList::Ids(p.tests),
            requests: RefList::Ids(p.requests),
            created_at: p.created_at,
        }
    }
}

impl PatientView {
    pub fn with_doctors(mut self, doctors: Vec<Doctor>) -> Self {
        self.doctors = RefList::Records(doctors);
        self
    }

    pub fn with_visits(mut self, visits: Vec<Visit>) -> Self {
        self.visits = RefList::Records(visits);
        self
    }

    pub fn with_prescriptions(mut self, prescriptions: Vec<Prescription>) -> Self {
        self.prescriptions = RefList::Records(prescriptions);
        self
    }

    pub fn with_tests(mut self, tests: Vec<TestRecord>) -> Self {
        self.tests = RefList::Records(tests);
        self
    }
}
