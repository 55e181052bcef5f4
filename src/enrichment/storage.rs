//! Object storage for uploaded files (Cloudinary signed uploads).

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};

use super::EnrichmentError;
use crate::models::{FileKind, UploadedFile};

/// Logical folder every upload lands in.
pub const UPLOAD_FOLDER: &str = "MedifyMe";

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `file` and return its public HTTPS URL.
    async fn upload(&self, file: &UploadedFile, kind: FileKind) -> Result<String, EnrichmentError>;
}

pub struct CloudinaryStorage {
    base_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    client: reqwest::Client,
}

impl CloudinaryStorage {
    pub fn new(base_url: &str, cloud_name: &str, api_key: &str, api_secret: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            cloud_name: cloud_name.to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn upload_url(&self, kind: FileKind) -> String {
        format!(
            "{}/v1_1/{}/{}/upload",
            self.base_url,
            self.cloud_name,
            kind.as_str()
        )
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Cloudinary request signature: SHA-1 over the alphabetically sorted
/// `key=value` pairs joined by `&`, followed by the API secret.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let mut hasher = Sha1::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl ObjectStorage for CloudinaryStorage {
    async fn upload(&self, file: &UploadedFile, kind: FileKind) -> Result<String, EnrichmentError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("folder", UPLOAD_FOLDER), ("timestamp", &timestamp)],
            &self.api_secret,
        );

        let mime = file
            .content_type
            .clone()
            .unwrap_or_else(|| mime_guess::from_path(&file.filename).first_or_octet_stream().to_string());
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.filename.clone())
            .mime_str(&mime)
            .map_err(|e| EnrichmentError::UploadFailed(format!("invalid content type: {e}")))?;

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", UPLOAD_FOLDER)
            .text("signature", signature);

        let response = self
            .client
            .post(self.upload_url(kind))
            .multipart(form)
            .send()
            .await
            .map_err(|e| EnrichmentError::UploadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EnrichmentError::UploadFailed(format!(
                "storage returned {status}: {body}"
            )));
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| EnrichmentError::UploadFailed(format!("unreadable response: {e}")))?;
        Ok(parsed.secure_url)
    }
}

/// In-memory storage: keeps uploaded bytes addressable by URL.
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            fail: false,
        }
    }

    /// Storage whose every upload fails.
    pub fn failing() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            fail: true,
        }
    }

    /// Bytes stored under `url`, if any.
    pub fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        self.objects.lock().ok()?.get(url).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(&self, file: &UploadedFile, kind: FileKind) -> Result<String, EnrichmentError> {
        if self.fail {
            return Err(EnrichmentError::UploadFailed("storage unavailable".into()));
        }
        let url = format!(
            "https://storage.test/{}/{}/{}/{}",
            kind.as_str(),
            UPLOAD_FOLDER,
            uuid::Uuid::new_v4(),
            file.filename
        );
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| EnrichmentError::UploadFailed("storage lock poisoned".into()))?;
        objects.insert(url.clone(), file.bytes.clone());
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_sha1_hex() {
        let sig = sign_params(&[("timestamp", "1700000000"), ("folder", "MedifyMe")], "secret");
        assert_eq!(sig.len(), 40);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_ignores_param_order() {
        let a = sign_params(&[("timestamp", "1"), ("folder", "F")], "s");
        let b = sign_params(&[("folder", "F"), ("timestamp", "1")], "s");
        assert_eq!(a, b);
    }

    #[test]
    fn signature_depends_on_secret() {
        let a = sign_params(&[("folder", "F")], "one");
        let b = sign_params(&[("folder", "F")], "two");
        assert_ne!(a, b);
    }

    #[test]
    fn upload_url_uses_resource_kind() {
        let storage = CloudinaryStorage::new("https://api.cloudinary.com/", "demo", "k", "s");
        assert_eq!(
            storage.upload_url(FileKind::Raw),
            "https://api.cloudinary.com/v1_1/demo/raw/upload"
        );
        assert_eq!(
            storage.upload_url(FileKind::Image),
            "https://api.cloudinary.com/v1_1/demo/image/upload"
        );
    }

    #[tokio::test]
    async fn memory_storage_returns_exact_bytes() {
        let storage = MemoryStorage::new();
        let file = UploadedFile {
            filename: "rx.png".into(),
            content_type: Some("image/png".into()),
            bytes: vec![0x89, 0x50, 0x4E, 0x47],
        };
        let url = storage.upload(&file, FileKind::Image).await.unwrap();
        assert!(url.contains("/image/MedifyMe/"));
        assert_eq!(storage.fetch(&url).unwrap(), file.bytes);
    }
}
