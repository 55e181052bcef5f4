use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{from_json, parse_date, parse_id, parse_timestamp, populate, to_json};
use crate::db::DatabaseError;
use crate::models::Visit;

pub fn insert_visit(conn: &Connection, visit: &Visit) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO visits (id, date, doctor_comments, patient_comments, doctor_name,
         patient, file_urls, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            visit.id.to_string(),
            visit.date.map(|d| d.to_string()),
            visit.doctor_comments,
            visit.patient_comments,
            visit.doctor_name,
            visit.patient.to_string(),
            to_json(&visit.file_url, "file_urls")?,
            visit.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_visit(conn: &Connection, id: &Uuid) -> Result<Option<Visit>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, date, doctor_comments, patient_comments, doctor_name,
             patient, file_urls, created_at
             FROM visits WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok(VisitRow {
                    id: row.get(0)?,
                    date: row.get(1)?,
                    doctor_comments: row.get(2)?,
                    patient_comments: row.get(3)?,
                    doctor_name: row.get(4)?,
                    patient: row.get(5)?,
                    file_urls: row.get(6)?,
                    created_at: row.get(7)?,
                })
            },
        )
        .optional()?;
    row.map(visit_from_row).transpose()
}

pub fn get_visits(conn: &Connection, ids: &[Uuid]) -> Result<Vec<Visit>, DatabaseError> {
    populate(ids, |id| get_visit(conn, id))
}

struct VisitRow {
    id: String,
    date: Option<String>,
    doctor_comments: Option<String>,
    patient_comments: Option<String>,
    doctor_name: Option<String>,
    patient: String,
    file_urls: String,
    created_at: String,
}

fn visit_from_row(row: VisitRow) -> Result<Visit, DatabaseError> {
    Ok(Visit {
        id: parse_id(&row.id, "id")?,
        date: parse_date(row.date)?,
        doctor_comments: row.doctor_comments,
        patient_comments: row.patient_comments,
        doctor_name: row.doctor_name,
        patient: parse_id(&row.patient, "patient")?,
        file_url: from_json(&row.file_urls, "file_urls")?,
        created_at: parse_timestamp(&row.created_at)?,
    })
}
