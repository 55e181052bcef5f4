use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{from_json, parse_date, parse_id, parse_timestamp, populate, to_json};
use crate::db::DatabaseError;
use crate::models::TestRecord;

pub fn insert_test(conn: &Connection, test: &TestRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO tests (id, date, test_name, test_comments, patient, files, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            test.id.to_string(),
            test.date.map(|d| d.to_string()),
            test.test_name,
            test.test_comments,
            test.patient.to_string(),
            to_json(&test.files, "files")?,
            test.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_test(conn: &Connection, id: &Uuid) -> Result<Option<TestRecord>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, date, test_name, test_comments, patient, files, created_at
             FROM tests WHERE id = ?1",
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

    row.map(|(id, date, test_name, test_comments, patient, files, created_at)| -> Result<TestRecord, DatabaseError> {
        Ok(TestRecord {
            id: parse_id(&id, "id")?,
            date: parse_date(date)?,
            test_name,
            test_comments,
            patient: parse_id(&patient, "patient")?,
            files: from_json(&files, "files")?,
            created_at: parse_timestamp(&created_at)?,
        })
    })
    .transpose()
}

pub fn get_tests(conn: &Connection, ids: &[Uuid]) -> Result<Vec<TestRecord>, DatabaseError> {
    populate(ids, |id| get_test(conn, id))
}
