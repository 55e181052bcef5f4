use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{from_json, parse_id, parse_timestamp, populate, to_json};
use crate::db::DatabaseError;
use crate::models::Doctor;

const DOCTOR_COLUMNS: &str = "id, name, email, photo, token, patients, requests, created_at";

pub fn insert_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    conn.execute(
        &format!("INSERT INTO doctors ({DOCTOR_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
        params![
            doctor.id.to_string(),
            doctor.name,
            doctor.email,
            doctor.photo,
            doctor.token,
            to_json(&doctor.patients, "patients")?,
            to_json(&doctor.requests, "requests")?,
            doctor.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_doctor(conn: &Connection, id: &Uuid) -> Result<Option<Doctor>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = ?1"),
            params![id.to_string()],
            read_row,
        )
        .optional()?;
    row.map(doctor_from_row).transpose()
}

/// Exact-match lookup on the email natural key.
pub fn get_doctor_by_email(conn: &Connection, email: &str) -> Result<Option<Doctor>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE email = ?1"),
            params![email],
            read_row,
        )
        .optional()?;
    row.map(doctor_from_row).transpose()
}

pub fn get_doctors(conn: &Connection, ids: &[Uuid]) -> Result<Vec<Doctor>, DatabaseError> {
    populate(ids, |id| get_doctor(conn, id))
}

pub fn update_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE doctors SET name = ?2, email = ?3, photo = ?4, token = ?5,
         patients = ?6, requests = ?7
         WHERE id = ?1",
        params![
            doctor.id.to_string(),
            doctor.name,
            doctor.email,
            doctor.photo,
            doctor.token,
            to_json(&doctor.patients, "patients")?,
            to_json(&doctor.requests, "requests")?,
        ],
    )?;
    if rows == 0 {
        return Err(DatabaseError::not_found("Doctor", doctor.id));
    }
    Ok(())
}

struct DoctorRow {
    id: String,
    name: Option<String>,
    email: String,
    photo: Option<String>,
    token: Option<String>,
    patients: String,
    requests: String,
    created_at: String,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<DoctorRow> {
    Ok(DoctorRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        photo: row.get(3)?,
        token: row.get(4)?,
        patients: row.get(5)?,
        requests: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn doctor_from_row(row: DoctorRow) -> Result<Doctor, DatabaseError> {
    Ok(Doctor {
        id: parse_id(&row.id, "id")?,
        name: row.name,
        email: row.email,
        photo: row.photo,
        token: row.token,
        patients: from_json(&row.patients, "patients")?,
        requests: from_json(&row.requests, "requests")?,
        created_at: parse_timestamp(&row.created_at)?,
    })
}
