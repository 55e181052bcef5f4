use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{parse_id, parse_timestamp, populate};
use crate::db::DatabaseError;
use crate::models::ConnectionRequest;

pub fn insert_request(conn: &Connection, request: &ConnectionRequest) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO requests (id, patient, doctor, patient_name, is_accepted, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            request.id.to_string(),
            request.patient.to_string(),
            request.doctor.to_string(),
            request.patient_name,
            request.is_accepted as i32,
            request.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_request(conn: &Connection, id: &Uuid) -> Result<Option<ConnectionRequest>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, patient, doctor, patient_name, is_accepted, created_at
             FROM requests WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, i32>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )
        .optional()?;

    row.map(|(id, patient, doctor, patient_name, is_accepted, created_at)| -> Result<ConnectionRequest, DatabaseError> {
        Ok(ConnectionRequest {
            id: parse_id(&id, "id")?,
            patient: parse_id(&patient, "patient")?,
            doctor: parse_id(&doctor, "doctor")?,
            patient_name,
            is_accepted: is_accepted != 0,
            created_at: parse_timestamp(&created_at)?,
        })
    })
    .transpose()
}

pub fn get_requests(conn: &Connection, ids: &[Uuid]) -> Result<Vec<ConnectionRequest>, DatabaseError> {
    populate(ids, |id| get_request(conn, id))
}

/// Delete a request only while it is still pending.
///
/// Returns `true` for exactly one caller per request: the statement is the
/// point at which an acceptance takes effect.
pub fn delete_pending_request(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let rows = conn.execute(
        "DELETE FROM requests WHERE id = ?1 AND is_accepted = 0",
        params![id.to_string()],
    )?;
    Ok(rows == 1)
}
