use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A patient's pending proposal to connect with a doctor.
///
/// Deleted when the doctor accepts. `is_accepted` is kept for wire
/// compatibility; new requests are always created with it unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequest {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub patient: Uuid,
    pub doctor: Uuid,
    pub patient_name: Option<String>,
    pub is_accepted: bool,
    pub created_at: DateTime<Utc>,
}

impl ConnectionRequest {
    pub fn new(patient: Uuid, doctor: Uuid, patient_name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient,
            doctor,
            patient_name,
            is_accepted: false,
            created_at: Utc::now(),
        }
    }
}
