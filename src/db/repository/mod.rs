//! Repository layer: entity-scoped database operations.
//!
//! Every function takes a `&Connection` so it composes inside a
//! `Store::transaction` as well as a plain `Store::read`.

mod doctor;
mod patient;
mod prescription;
mod request;
mod test_record;
mod visit;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use super::DatabaseError;

pub use doctor::*;
pub use patient::*;
pub use prescription::*;
pub use request::*;
pub use test_record::*;
pub use visit::*;

fn to_json<T: Serialize + ?Sized>(value: &T, column: &'static str) -> Result<String, DatabaseError> {
    serde_json::to_string(value).map_err(|e| DatabaseError::CorruptColumn {
        column,
        reason: e.to_string(),
    })
}

fn from_json<T: DeserializeOwned>(raw: &str, column: &'static str) -> Result<T, DatabaseError> {
    serde_json::from_str(raw).map_err(|e| DatabaseError::CorruptColumn {
        column,
        reason: e.to_string(),
    })
}

fn parse_id(raw: &str, column: &'static str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|e| DatabaseError::CorruptColumn {
        column,
        reason: e.to_string(),
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| DatabaseError::CorruptColumn {
            column: "created_at",
            reason: e.to_string(),
        })
}

fn parse_date(raw: Option<String>) -> Result<Option<NaiveDate>, DatabaseError> {
    raw.map(|s| {
        NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| DatabaseError::CorruptColumn {
            column: "date",
            reason: e.to_string(),
        })
    })
    .transpose()
}

/// Load every id in `ids` with `get`, in list order, skipping ids whose
/// record no longer exists.
fn populate<T>(
    ids: &[Uuid],
    mut get: impl FnMut(&Uuid) -> Result<Option<T>, DatabaseError>,
) -> Result<Vec<T>, DatabaseError> {
    let mut records = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(record) = get(id)? {
            records.push(record);
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::*;
    use chrono::Utc;
    use rusqlite::Connection;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn make_patient(conn: &Connection, email: &str) -> Patient {
        let patient = PatientRegistration {
            name: Some("Meera Nair".into()),
            email: Some(email.into()),
            age: Some(34),
            height: Some(162.5),
            ..Default::default()
        }
        .into_patient();
        insert_patient(conn, &patient).unwrap();
        patient
    }

    fn make_doctor(conn: &Connection, email: &str) -> Doctor {
        let doctor = Doctor::new(email.into(), Some("Dr. Rao".into()), None, Some("tok".into()));
        insert_doctor(conn, &doctor).unwrap();
        doctor
    }

    #[test]
    fn patient_insert_and_retrieve() {
        let conn = test_db();
        let patient = make_patient(&conn, "meera@example.com");
        let loaded = get_patient(&conn, &patient.id).unwrap().unwrap();
        assert_eq!(loaded, patient);
    }

    #[test]
    fn patient_lookup_by_email_is_exact() {
        let conn = test_db();
        make_patient(&conn, "meera@example.com");
        assert!(get_patient_by_email(&conn, "meera@example.com").unwrap().is_some());
        assert!(get_patient_by_email(&conn, "MEERA@example.com").unwrap().is_none());
    }

    #[test]
    fn patient_reference_lists_keep_order() {
        let conn = test_db();
        let mut patient = make_patient(&conn, "meera@example.com");
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        patient.visits = ids.clone();
        patient.tests.push(ids[2]);
        update_patient(&conn, &patient).unwrap();
        let loaded = get_patient(&conn, &patient.id).unwrap().unwrap();
        assert_eq!(loaded.visits, ids);
        assert_eq!(loaded.tests, vec![ids[2]]);
    }

    #[test]
    fn update_missing_patient_is_not_found() {
        let conn = test_db();
        let ghost = PatientRegistration::default().into_patient();
        let err = update_patient(&conn, &ghost).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn doctor_insert_and_lookup_by_email() {
        let conn = test_db();
        let doctor = make_doctor(&conn, "rao@clinic.in");
        let by_email = get_doctor_by_email(&conn, "rao@clinic.in").unwrap().unwrap();
        assert_eq!(by_email.id, doctor.id);
        assert!(get_doctor(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn doctor_email_is_unique() {
        let conn = test_db();
        make_doctor(&conn, "rao@clinic.in");
        let dup = Doctor::new("rao@clinic.in".into(), None, None, None);
        assert!(insert_doctor(&conn, &dup).is_err());
    }

    #[test]
    fn populate_skips_missing_records_and_keeps_order() {
        let conn = test_db();
        let a = make_doctor(&conn, "a@clinic.in");
        let b = make_doctor(&conn, "b@clinic.in");
        let ids = vec![b.id, Uuid::new_v4(), a.id];
        let doctors = get_doctors(&conn, &ids).unwrap();
        let got: Vec<Uuid> = doctors.iter().map(|d| d.id).collect();
        assert_eq!(got, vec![b.id, a.id]);
    }

    #[test]
    fn pending_request_delete_happens_once() {
        let conn = test_db();
        let request = ConnectionRequest::new(Uuid::new_v4(), Uuid::new_v4(), Some("Meera".into()));
        insert_request(&conn, &request).unwrap();
        assert!(delete_pending_request(&conn, &request.id).unwrap());
        assert!(!delete_pending_request(&conn, &request.id).unwrap());
        assert!(get_request(&conn, &request.id).unwrap().is_none());
    }

    #[test]
    fn accepted_request_is_not_deleted_as_pending() {
        let conn = test_db();
        let mut request = ConnectionRequest::new(Uuid::new_v4(), Uuid::new_v4(), None);
        request.is_accepted = true;
        insert_request(&conn, &request).unwrap();
        assert!(!delete_pending_request(&conn, &request.id).unwrap());
        assert!(get_request(&conn, &request.id).unwrap().unwrap().is_accepted);
    }

    #[test]
    fn visit_round_trip_with_file_urls() {
        let conn = test_db();
        let patient = make_patient(&conn, "meera@example.com");
        let visit = Visit {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 2, 1),
            doctor_comments: Some("Rest".into()),
            patient_comments: None,
            doctor_name: Some("Dr. Rao".into()),
            patient: patient.id,
            file_url: vec!["https://cdn/a.png".into(), "https://cdn/b.pdf".into()],
            created_at: Utc::now(),
        };
        insert_visit(&conn, &visit).unwrap();
        let loaded = get_visit(&conn, &visit.id).unwrap().unwrap();
        assert_eq!(loaded.file_url, visit.file_url);
        assert_eq!(loaded.date, visit.date);
    }

    #[test]
    fn prescription_and_test_keep_file_results() {
        let conn = test_db();
        let patient = make_patient(&conn, "meera@example.com");
        let files = vec![
            FileResult {
                url: "https://cdn/rx.png".into(),
                ocr: Some("<p>Take twice daily</p>".into()),
            },
            FileResult::bare("https://cdn/rx.pdf"),
        ];
        let rx = Prescription {
            id: Uuid::new_v4(),
            date: None,
            medications: Some("Amoxicillin".into()),
            prescription_comments: None,
            patient: patient.id,
            files: files.clone(),
            created_at: Utc::now(),
        };
        insert_prescription(&conn, &rx).unwrap();
        assert_eq!(get_prescription(&conn, &rx.id).unwrap().unwrap().files, files);

        let test = TestRecord {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 5, 20),
            test_name: Some("CBC".into()),
            test_comments: None,
            patient: patient.id,
            files: files.clone(),
            created_at: Utc::now(),
        };
        insert_test(&conn, &test).unwrap();
        let tests = get_tests(&conn, &[test.id]).unwrap();
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].files, files);
    }
}
