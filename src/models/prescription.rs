use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::FileResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub date: Option<NaiveDate>,
    pub medications: Option<String>,
    pub prescription_comments: Option<String>,
    pub patient: Uuid,
    pub files: Vec<FileResult>,
    pub created_at: DateTime<Utc>,
}
