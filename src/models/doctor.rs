use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub photo: Option<String>,
    pub token: Option<String>,
    pub patients: Vec<Uuid>,
    pub requests: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Doctor {
    pub fn new(email: String, name: Option<String>, photo: Option<String>, token: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            photo,
            token,
            patients: Vec::new(),
            requests: Vec::new(),
            created_at: Utc::now(),
        }
    }
}
