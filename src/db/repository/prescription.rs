use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{from_json, parse_date, parse_id, parse_timestamp, populate, to_json};
use crate::db::DatabaseError;
use crate::models::Prescription;

pub fn insert_prescription(conn: &Connection, rx: &Prescription) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO prescriptions (id, date, medications, prescription_comments, patient,
         files, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            rx.id.to_string(),
            rx.date.map(|d| d.to_string()),
            rx.medications,
            rx.prescription_comments,
            rx.patient.to_string(),
            to_json(&rx.files, "files")?,
            rx.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_prescription(conn: &Connection, id: &Uuid) -> Result<Option<Prescription>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, date, medications, prescription_comments, patient, files, created_at
             FROM prescriptions WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            },
        )
        .optional()?;

    row.map(|(id, date, medications, comments, patient, files, created_at)| -> Result<Prescription, DatabaseError> {
        Ok(Prescription {
            id: parse_id(&id, "id")?,
            date: parse_date(date)?,
            medications,
            prescription_comments: comments,
            patient: parse_id(&patient, "patient")?,
            files: from_json(&files, "files")?,
            created_at: parse_timestamp(&created_at)?,
        })
    })
    .transpose()
}

pub fn get_prescriptions(conn: &Connection, ids: &[Uuid]) -> Result<Vec<Prescription>, DatabaseError> {
    populate(ids, |id| get_prescription(conn, id))
}
