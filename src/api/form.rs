//! Multipart submission forms: text fields plus repeated `files` parts.

use axum::extract::Multipart;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::require_id;
use crate::models::UploadedFile;

#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: Map<String, Value>,
    pub files: Vec<UploadedFile>,
}

fn is_file_field(name: &str) -> bool {
    name == "files" || name == "files[]"
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(filename) if is_file_field(&name) => {
                    let content_type = field
                        .content_type()
                        .map(str::to_string)
                        .or_else(|| mime_guess::from_path(&filename).first_raw().map(str::to_string));
                    let bytes = field.bytes().await?;
                    form.files.push(UploadedFile {
                        filename,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                Some(_) => {
                    return Err(ApiError::BadRequest(format!("Unexpected file field: {name}")));
                }
                None => {
                    let text = field.text().await?;
                    form.fields.insert(name, Value::String(text));
                }
            }
        }
        Ok(form)
    }

    /// Remove and parse the owning patient's `id` field.
    pub fn take_patient_id(&mut self) -> Result<Uuid, ApiError> {
        let raw = self.fields.remove("id");
        require_id(raw.as_ref().and_then(Value::as_str), "No patient id provided", "Patient")
    }

    /// Deserialize the remaining text fields, rejecting unknown names.
    pub fn parse<F: DeserializeOwned>(self) -> Result<F, ApiError> {
        serde_json::from_value(Value::Object(self.fields))
            .map_err(|e| ApiError::BadRequest(format!("Invalid form: {e}")))
    }
}
