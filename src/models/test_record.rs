use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::FileResult;

/// A diagnostic test result uploaded by a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub date: Option<NaiveDate>,
    pub test_name: Option<String>,
    pub test_comments: Option<String>,
    pub patient: Uuid,
    pub files: Vec<FileResult>,
    pub created_at: DateTime<Utc>,
}
