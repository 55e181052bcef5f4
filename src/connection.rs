//! Patient → doctor connection workflow.
//!
//! `NONE → REQUESTED → CONNECTED`. A request exists only while pending;
//! accepting it deletes the record and links both parties. Each operation
//! runs in one store transaction.

use uuid::Uuid;

use crate::db::{self, DatabaseError, Store};
use crate::models::ConnectionRequest;

/// Result of a patient asking to connect with a doctor.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    Created(ConnectionRequest),
    PatientNotFound,
    DoctorNotFound,
    AlreadyRequested,
    AlreadyPatient,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AcceptOutcome {
    Accepted { doctor_id: Uuid, patient_id: Uuid },
    NotFound,
    /// Only reachable for rows stored with the flag already set.
    AlreadyAccepted,
}

fn push_unique(list: &mut Vec<Uuid>, id: Uuid) {
    if !list.contains(&id) {
        list.push(id);
    }
}

/// Create a pending request from `patient_id` to the doctor with `doctor_email`.
pub fn request_doctor(
    store: &Store,
    patient_id: &Uuid,
    doctor_email: &str,
) -> Result<RequestOutcome, DatabaseError> {
    store.transaction(|tx| {
        let Some(mut patient) = db::get_patient(tx, patient_id)? else {
            return Ok(RequestOutcome::PatientNotFound);
        };
        let Some(mut doctor) = db::get_doctor_by_email(tx, doctor_email)? else {
            return Ok(RequestOutcome::DoctorNotFound);
        };

        let pending = db::get_requests(tx, &patient.requests)?;
        if pending.iter().any(|r| r.doctor == doctor.id) {
            return Ok(RequestOutcome::AlreadyRequested);
        }
        if doctor.patients.contains(&patient.id) || patient.doctors.contains(&doctor.id) {
            return Ok(RequestOutcome::AlreadyPatient);
        }

        let request = ConnectionRequest::new(patient.id, doctor.id, patient.name.clone());
        db::insert_request(tx, &request)?;
        patient.requests.push(request.id);
        doctor.requests.push(request.id);
        db::update_patient(tx, &patient)?;
        db::update_doctor(tx, &doctor)?;

        tracing::info!(
            request_id = %request.id,
            patient_id = %patient.id,
            doctor_id = %doctor.id,
            "Connection requested"
        );
        Ok(RequestOutcome::Created(request))
    })
}

/// Accept a pending request: delete it and link doctor and patient.
///
/// The conditional delete decides the winner when two accepts race on the
/// same id; the loser observes `NotFound`.
pub fn accept_request(store: &Store, request_id: &Uuid) -> Result<AcceptOutcome, DatabaseError> {
    store.transaction(|tx| {
        let Some(request) = db::get_request(tx, request_id)? else {
            return Ok(AcceptOutcome::NotFound);
        };
        if request.is_accepted {
            return Ok(AcceptOutcome::AlreadyAccepted);
        }
        if !db::delete_pending_request(tx, &request.id)? {
            return Ok(AcceptOutcome::NotFound);
        }

        let mut doctor = db::get_doctor(tx, &request.doctor)?
            .ok_or_else(|| DatabaseError::not_found("doctor", request.doctor))?;
        let mut patient = db::get_patient(tx, &request.patient)?
            .ok_or_else(|| DatabaseError::not_found("patient", request.patient))?;

        doctor.requests.retain(|id| *id != request.id);
        patient.requests.retain(|id| *id != request.id);
        push_unique(&mut doctor.patients, patient.id);
        push_unique(&mut patient.doctors, doctor.id);
        db::update_doctor(tx, &doctor)?;
        db::update_patient(tx, &patient)?;

        tracing::info!(
            request_id = %request.id,
            patient_id = %patient.id,
            doctor_id = %doctor.id,
            "Connection accepted"
        );
        Ok(AcceptOutcome::Accepted {
            doctor_id: doctor.id,
            patient_id: patient.id,
        })
    })
}
