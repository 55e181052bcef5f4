//! Document submission: enrich uploaded files, create the record, attach it
//! to the owning patient.

use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, DatabaseError, Store};
use crate::enrichment::{Enricher, EnrichmentError};
use crate::models::{parse_record_date, FileResult, Patient, Prescription, TestRecord, UploadedFile, Visit};

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Patient not found: {0}")]
    PatientNotFound(Uuid),

    #[error("No files provided")]
    NoFiles,

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// A child record owned by one patient and listed on the patient document.
pub trait PatientRecord {
    fn id(&self) -> Uuid;
    fn insert(&self, conn: &Connection) -> Result<(), DatabaseError>;
    /// The patient's reference list this record is appended to.
    fn patient_list(patient: &mut Patient) -> &mut Vec<Uuid>;
}

/// Text part of a submission form.
pub trait SubmissionForm {
    type Record: PatientRecord;
    /// Run OCR + summary on image uploads.
    const WANTS_OCR: bool;
    const REQUIRES_FILES: bool;

    /// Raw `date` field, parsed before any upload happens.
    fn raw_date(&self) -> Option<&str>;

    fn into_record(self, patient: Uuid, date: Option<NaiveDate>, files: Vec<FileResult>) -> Self::Record;
}

fn form_date(raw: Option<&str>) -> Result<Option<NaiveDate>, SubmissionError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => parse_record_date(s)
            .map(Some)
            .ok_or_else(|| SubmissionError::InvalidDate(s.to_string())),
    }
}

// ═══════════════════════════════════════════
// Forms
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VisitForm {
    pub date: Option<String>,
    pub doctor_comments: Option<String>,
    pub patient_comments: Option<String>,
    pub doctor_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PrescriptionForm {
    pub date: Option<String>,
    pub medications: Option<String>,
    pub prescription_comments: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TestForm {
    pub date: Option<String>,
    pub test_name: Option<String>,
    pub test_comments: Option<String>,
}

impl SubmissionForm for VisitForm {
    type Record = Visit;
    const WANTS_OCR: bool = false;
    const REQUIRES_FILES: bool = false;

    fn raw_date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    fn into_record(self, patient: Uuid, date: Option<NaiveDate>, files: Vec<FileResult>) -> Visit {
        Visit {
            id: Uuid::new_v4(),
            date,
            doctor_comments: self.doctor_comments,
            patient_comments: self.patient_comments,
            doctor_name: self.doctor_name,
            patient,
            file_url: files.into_iter().map(|f| f.url).collect(),
            created_at: Utc::now(),
        }
    }
}

impl SubmissionForm for PrescriptionForm {
    type Record = Prescription;
    const WANTS_OCR: bool = true;
    const REQUIRES_FILES: bool = true;

    fn raw_date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    fn into_record(self, patient: Uuid, date: Option<NaiveDate>, files: Vec<FileResult>) -> Prescription {
        Prescription {
            id: Uuid::new_v4(),
            date,
            medications: self.medications,
            prescription_comments: self.prescription_comments,
            patient,
            files,
            created_at: Utc::now(),
        }
    }
}

impl SubmissionForm for TestForm {
    type Record = TestRecord;
    const WANTS_OCR: bool = true;
    const REQUIRES_FILES: bool = false;

    fn raw_date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    fn into_record(self, patient: Uuid, date: Option<NaiveDate>, files: Vec<FileResult>) -> TestRecord {
        TestRecord {
            id: Uuid::new_v4(),
            date,
            test_name: self.test_name,
            test_comments: self.test_comments,
            patient,
            files,
            created_at: Utc::now(),
        }
    }
}

impl PatientRecord for Visit {
    fn id(&self) -> Uuid {
        self.id
    }
    fn insert(&self, conn: &Connection) -> Result<(), DatabaseError> {
        db::insert_visit(conn, self)
    }
    fn patient_list(patient: &mut Patient) -> &mut Vec<Uuid> {
        &mut patient.visits
    }
}

impl PatientRecord for Prescription {
    fn id(&self) -> Uuid {
        self.id
    }
    fn insert(&self, conn: &Connection) -> Result<(), DatabaseError> {
        db::insert_prescription(conn, self)
    }
    fn patient_list(patient: &mut Patient) -> &mut Vec<Uuid> {
        &mut patient.prescriptions
    }
}

impl PatientRecord for TestRecord {
    fn id(&self) -> Uuid {
        self.id
    }
    fn insert(&self, conn: &Connection) -> Result<(), DatabaseError> {
        db::insert_test(conn, self)
    }
    fn patient_list(patient: &mut Patient) -> &mut Vec<Uuid> {
        &mut patient.tests
    }
}

// ═══════════════════════════════════════════
// Pipeline
// ═══════════════════════════════════════════

/// Validate the form, enrich `files` in upload order, then create the record
/// and append it to the patient in one transaction. Nothing is uploaded for
/// an invalid form and the first enrichment failure aborts before anything
/// is written.
pub async fn submit<F: SubmissionForm>(
    store: &Store,
    enricher: &Enricher,
    patient_id: &Uuid,
    form: F,
    files: &[UploadedFile],
) -> Result<F::Record, SubmissionError> {
    if F::REQUIRES_FILES && files.is_empty() {
        return Err(SubmissionError::NoFiles);
    }
    let date = form_date(form.raw_date())?;
    if store.read(|conn| db::get_patient(conn, patient_id))?.is_none() {
        return Err(SubmissionError::PatientNotFound(*patient_id));
    }

    let results = enricher.enrich_all(files, F::WANTS_OCR).await?;
    let record = form.into_record(*patient_id, date, results);

    store.transaction(|tx| {
        // Re-read inside the transaction: the patient may have changed
        // while files were being enriched.
        let mut patient = db::get_patient(tx, patient_id)?
            .ok_or(SubmissionError::PatientNotFound(*patient_id))?;
        record.insert(tx)?;
        <F::Record as PatientRecord>::patient_list(&mut patient).push(record.id());
        db::update_patient(tx, &patient)?;
        Ok::<_, SubmissionError>(())
    })?;

    tracing::info!(
        patient_id = %patient_id,
        record_id = %record.id(),
        files = files.len(),
        "Submission stored"
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::llm::MockChatModel;
    use crate::enrichment::ocr::MockOcrEngine;
    use crate::enrichment::storage::MemoryStorage;
    use crate::models::PatientRegistration;
    use std::sync::Arc;

    fn enricher(storage: MemoryStorage) -> Enricher {
        Enricher::new(
            Arc::new(storage),
            Arc::new(MockOcrEngine::new("Paracetamol 650mg")),
            Arc::new(MockChatModel::new("<p>Take after food</p>")),
        )
    }

    fn seed_patient(store: &Store) -> Uuid {
        let patient = PatientRegistration {
            name: Some("Asha".into()),
            ..Default::default()
        }
        .into_patient();
        store.transaction(|tx| db::insert_patient(tx, &patient)).unwrap();
        patient.id
    }

    fn upload(name: &str) -> UploadedFile {
        UploadedFile {
            filename: name.into(),
            content_type: None,
            bytes: name.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn visit_keeps_bare_urls_in_order() {
        let store = Store::open_in_memory().unwrap();
        let patient_id = seed_patient(&store);
        let form = VisitForm {
            date: Some("2024-03-01".into()),
            doctor_name: Some("Dr. House".into()),
            ..Default::default()
        };

        let visit = submit(
            &store,
            &enricher(MemoryStorage::new()),
            &patient_id,
            form,
            &[upload("a.png"), upload("b.pdf")],
        )
        .await
        .unwrap();

        assert_eq!(visit.file_url.len(), 2);
        assert!(visit.file_url[0].ends_with("/a.png"));
        assert!(visit.file_url[1].ends_with("/b.pdf"));
        assert_eq!(visit.date, NaiveDate::from_ymd_opt(2024, 3, 1));

        let patient = store.read(|c| db::get_patient(c, &patient_id)).unwrap().unwrap();
        assert_eq!(patient.visits, vec![visit.id]);
        let stored = store.read(|c| db::get_visit(c, &visit.id)).unwrap().unwrap();
        assert_eq!(stored, visit);
    }

    #[tokio::test]
    async fn prescription_summarizes_images_only() {
        let store = Store::open_in_memory().unwrap();
        let patient_id = seed_patient(&store);

        let rx = submit(
            &store,
            &enricher(MemoryStorage::new()),
            &patient_id,
            PrescriptionForm::default(),
            &[upload("rx.jpg"), upload("rx.pdf")],
        )
        .await
        .unwrap();

        assert_eq!(rx.files[0].ocr.as_deref(), Some("<p>Take after food</p>"));
        assert_eq!(rx.files[1].ocr, None);
        let patient = store.read(|c| db::get_patient(c, &patient_id)).unwrap().unwrap();
        assert_eq!(patient.prescriptions, vec![rx.id]);
    }

    #[tokio::test]
    async fn prescription_requires_files() {
        let store = Store::open_in_memory().unwrap();
        let patient_id = seed_patient(&store);
        let err = submit(
            &store,
            &enricher(MemoryStorage::new()),
            &patient_id,
            PrescriptionForm::default(),
            &[],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SubmissionError::NoFiles));
    }

    #[tokio::test]
    async fn test_record_without_files_is_allowed() {
        let store = Store::open_in_memory().unwrap();
        let patient_id = seed_patient(&store);
        let form = TestForm {
            test_name: Some("CBC".into()),
            ..Default::default()
        };
        let test = submit(&store, &enricher(MemoryStorage::new()), &patient_id, form, &[])
            .await
            .unwrap();
        assert!(test.files.is_empty());
        let patient = store.read(|c| db::get_patient(c, &patient_id)).unwrap().unwrap();
        assert_eq!(patient.tests, vec![test.id]);
    }

    #[tokio::test]
    async fn unknown_patient_uploads_nothing() {
        let store = Store::open_in_memory().unwrap();
        let storage = Arc::new(MemoryStorage::new());
        let gateway = Enricher::new(
            storage.clone(),
            Arc::new(MockOcrEngine::new("x")),
            Arc::new(MockChatModel::new("y")),
        );
        let missing = Uuid::new_v4();
        let err = submit(&store, &gateway, &missing, VisitForm::default(), &[upload("a.png")])
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::PatientNotFound(id) if id == missing));
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn enrichment_failure_creates_no_record() {
        let store = Store::open_in_memory().unwrap();
        let patient_id = seed_patient(&store);
        let err = submit(
            &store,
            &enricher(MemoryStorage::failing()),
            &patient_id,
            TestForm::default(),
            &[upload("a.png")],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SubmissionError::Enrichment(EnrichmentError::UploadFailed(_))));
        let patient = store.read(|c| db::get_patient(c, &patient_id)).unwrap().unwrap();
        assert!(patient.tests.is_empty());
    }

    #[tokio::test]
    async fn malformed_date_is_rejected_before_upload() {
        let store = Store::open_in_memory().unwrap();
        let patient_id = seed_patient(&store);
        let storage = Arc::new(MemoryStorage::new());
        let gateway = Enricher::new(
            storage.clone(),
            Arc::new(MockOcrEngine::new("x")),
            Arc::new(MockChatModel::new("y")),
        );
        let form = TestForm {
            date: Some("yesterday".into()),
            ..Default::default()
        };
        let err = submit(&store, &gateway, &patient_id, form, &[upload("cbc.png")])
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::InvalidDate(d) if d == "yesterday"));
        assert_eq!(storage.len(), 0);
        let patient = store.read(|c| db::get_patient(c, &patient_id)).unwrap().unwrap();
        assert!(patient.tests.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_submissions_all_reach_the_patient() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let patient_id = seed_patient(&store);
        let gateway = Arc::new(enricher(MemoryStorage::new()));

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                let gateway = gateway.clone();
                tokio::spawn(async move {
                    let form = VisitForm {
                        doctor_name: Some(format!("Dr. {i}")),
                        ..Default::default()
                    };
                    let file = upload(&format!("visit-{i}.png"));
                    submit(&store, &gateway, &patient_id, form, &[file]).await
                })
            })
            .collect();

        let mut submitted = Vec::new();
        for task in tasks {
            submitted.push(task.await.unwrap().unwrap().id);
        }

        let patient = store.read(|c| db::get_patient(c, &patient_id)).unwrap().unwrap();
        assert_eq!(patient.visits.len(), 16);
        for id in &submitted {
            assert!(patient.visits.contains(id));
        }
    }

    #[test]
    fn forms_reject_unknown_fields() {
        let err = serde_json::from_value::<VisitForm>(serde_json::json!({"date": "2024-01-01", "admin": "1"}));
        assert!(err.is_err());
        let ok = serde_json::from_value::<TestForm>(serde_json::json!({"testName": "CBC"})).unwrap();
        assert_eq!(ok.test_name.as_deref(), Some("CBC"));
    }
}
