use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub date: Option<NaiveDate>,
    pub doctor_comments: Option<String>,
    pub patient_comments: Option<String>,
    /// Free text, not a reference to a Doctor record.
    pub doctor_name: Option<String>,
    pub patient: Uuid,
    pub file_url: Vec<String>,
    pub created_at: DateTime<Utc>,
}
