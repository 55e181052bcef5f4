use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{from_json, parse_id, parse_timestamp, populate, to_json};
use crate::db::DatabaseError;
use crate::models::Patient;

const PATIENT_COLUMNS: &str = "id, name, email, photo, token, age, gender, height, weight,
     allergies, other_conditions, medications, overview,
     doctors, visits, prescriptions, tests, requests, created_at";

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO patients ({PATIENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)"
        ),
        params![
            patient.id.to_string(),
            patient.name,
            patient.email,
            patient.photo,
            patient.token,
            patient.age,
            patient.gender,
            patient.height,
            patient.weight,
            patient.allergies,
            patient.other_conditions,
            patient.medications,
            patient.overview,
            to_json(&patient.doctors, "doctors")?,
            to_json(&patient.visits, "visits")?,
            to_json(&patient.prescriptions, "prescriptions")?,
            to_json(&patient.tests, "tests")?,
            to_json(&patient.requests, "requests")?,
            patient.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1"),
            params![id.to_string()],
            read_row,
        )
        .optional()?;
    row.map(patient_from_row).transpose()
}

/// Exact-match lookup on the email natural key. Returns the oldest match.
pub fn get_patient_by_email(conn: &Connection, email: &str) -> Result<Option<Patient>, DatabaseError> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {PATIENT_COLUMNS} FROM patients WHERE email = ?1
                 ORDER BY created_at LIMIT 1"
            ),
            params![email],
            read_row,
        )
        .optional()?;
    row.map(patient_from_row).transpose()
}

pub fn get_patients(conn: &Connection, ids: &[Uuid]) -> Result<Vec<Patient>, DatabaseError> {
    populate(ids, |id| get_patient(conn, id))
}

/// Persist the profile fields and every reference list.
pub fn update_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE patients SET name = ?2, email = ?3, photo = ?4, token = ?5, age = ?6,
         gender = ?7, height = ?8, weight = ?9, allergies = ?10, other_conditions = ?11,
         medications = ?12, overview = ?13, doctors = ?14, visits = ?15,
         prescriptions = ?16, tests = ?17, requests = ?18
         WHERE id = ?1",
        params![
            patient.id.to_string(),
            patient.name,
            patient.email,
            patient.photo,
            patient.token,
            patient.age,
            patient.gender,
            patient.height,
            patient.weight,
            patient.allergies,
            patient.other_conditions,
            patient.medications,
            patient.overview,
            to_json(&patient.doctors, "doctors")?,
            to_json(&patient.visits, "visits")?,
            to_json(&patient.prescriptions, "prescriptions")?,
            to_json(&patient.tests, "tests")?,
            to_json(&patient.requests, "requests")?,
        ],
    )?;
    if rows == 0 {
        return Err(DatabaseError::not_found("Patient", patient.id));
    }
    Ok(())
}

struct PatientRow {
    id: String,
    name: Option<String>,
    email: Option<String>,
    photo: Option<String>,
    token: Option<String>,
    age: Option<u32>,
    gender: Option<String>,
    height: Option<f64>,
    weight: Option<f64>,
    allergies: Option<String>,
    other_conditions: Option<String>,
    medications: Option<String>,
    overview: Option<String>,
    doctors: String,
    visits: String,
    prescriptions: String,
    tests: String,
    requests: String,
    created_at: String,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<PatientRow> {
    Ok(PatientRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        photo: row.get(3)?,
        token: row.get(4)?,
        age: row.get(5)?,
        gender: row.get(6)?,
        height: row.get(7)?,
        weight: row.get(8)?,
        allergies: row.get(9)?,
        other_conditions: row.get(10)?,
        medications: row.get(11)?,
        overview: row.get(12)?,
        doctors: row.get(13)?,
        visits: row.get(14)?,
        prescriptions: row.get(15)?,
        tests: row.get(16)?,
        requests: row.get(17)?,
        created_at: row.get(18)?,
    })
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    Ok(Patient {
        id: parse_id(&row.id, "id")?,
        name: row.name,
        email: row.email,
        photo: row.photo,
        token: row.token,
        age: row.age,
        gender: row.gender,
        height: row.height,
        weight: row.weight,
        allergies: row.allergies,
        other_conditions: row.other_conditions,
        medications: row.medications,
        overview: row.overview,
        doctors: from_json(&row.doctors, "doctors")?,
        visits: from_json(&row.visits, "visits")?,
        prescriptions: from_json(&row.prescriptions, "prescriptions")?,
        tests: from_json(&row.tests, "tests")?,
        requests: from_json(&row.requests, "requests")?,
        created_at: parse_timestamp(&row.created_at)?,
    })
}
