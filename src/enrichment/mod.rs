//! External enrichment gateway.
//!
//! One uploaded file goes through: object storage upload, then (images
//! only, when requested) OCR of the stored URL, then a chat-model summary
//! of the extracted text. Every call is made once; the first failure aborts.

pub mod llm;
pub mod ocr;
pub mod prompt;
pub mod storage;

use std::sync::Arc;

use thiserror::Error;

use crate::models::{FileKind, FileResult, UploadedFile};
use llm::{first_choice_content, ChatMessage, ChatModel, ChatRequest};
use ocr::OcrEngine;
use storage::ObjectStorage;

/// Sampling temperature for prescription summaries.
const SUMMARY_TEMPERATURE: f32 = 0.5;

#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("OCR request failed: {0}")]
    OcrFailed(String),

    #[error("Summary request failed: {0}")]
    SummaryFailed(String),
}

pub struct Enricher {
    storage: Arc<dyn ObjectStorage>,
    ocr: Arc<dyn OcrEngine>,
    chat: Arc<dyn ChatModel>,
}

impl Enricher {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        ocr: Arc<dyn OcrEngine>,
        chat: Arc<dyn ChatModel>,
    ) -> Self {
        Self { storage, ocr, chat }
    }

    /// Upload one file and, if `wants_ocr` and the file is an image,
    /// attach the summarized OCR text.
    pub async fn enrich(&self, file: &UploadedFile, wants_ocr: bool) -> Result<FileResult, EnrichmentError> {
        let kind = FileKind::classify(&file.filename);
        let url = self.storage.upload(file, kind).await.map_err(|e| {
            tracing::error!(error = %e, filename = %file.filename, "Storage upload failed");
            e
        })?;
        tracing::debug!(%url, kind = %kind, "File stored");

        if !wants_ocr || kind != FileKind::Image {
            return Ok(FileResult::bare(url));
        }

        // The file is already stored at this point; a failure below loses
        // the URL along with the rest of the submission.
        let text = self.ocr.extract_text(&url).await.map_err(|e| {
            tracing::error!(error = %e, %url, "OCR failed after upload");
            e
        })?;

        let summary = self.summarize(&text).await.map_err(|e| {
            tracing::error!(error = %e, %url, "Summary failed after OCR");
            e
        })?;

        Ok(FileResult {
            url,
            ocr: Some(summary),
        })
    }

    /// Enrich `files` one after another, preserving upload order.
    pub async fn enrich_all(
        &self,
        files: &[UploadedFile],
        wants_ocr: bool,
    ) -> Result<Vec<FileResult>, EnrichmentError> {
        let mut results = Vec::with_capacity(files.len());
        for file in files {
            results.push(self.enrich(file, wants_ocr).await?);
        }
        Ok(results)
    }

    async fn summarize(&self, ocr_text: &str) -> Result<String, EnrichmentError> {
        let request = ChatRequest::new(vec![ChatMessage::user(
            prompt::prescription_summary_prompt(ocr_text),
        )])
        .with_temperature(SUMMARY_TEMPERATURE);

        let response = self
            .chat
            .complete(&request)
            .await
            .map_err(|e| EnrichmentError::SummaryFailed(e.to_string()))?;
        first_choice_content(&response).map_err(|e| EnrichmentError::SummaryFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm::MockChatModel;
    use ocr::MockOcrEngine;
    use storage::MemoryStorage;

    fn file(name: &str, bytes: &[u8]) -> UploadedFile {
        UploadedFile {
            filename: name.into(),
            content_type: None,
            bytes: bytes.to_vec(),
        }
    }

    fn enricher(storage: Arc<MemoryStorage>, ocr: MockOcrEngine, chat: MockChatModel) -> Enricher {
        Enricher::new(storage, Arc::new(ocr), Arc::new(chat))
    }

    #[tokio::test]
    async fn image_with_ocr_gets_summary_and_exact_bytes() {
        let storage = Arc::new(MemoryStorage::new());
        let gateway = enricher(
            storage.clone(),
            MockOcrEngine::new("Tab. Metformin 500mg"),
            MockChatModel::new("<h3>Metformin</h3>"),
        );
        let bytes = [0x89, 0x50, 0x4E, 0x47, 1, 2, 3];
        let result = gateway.enrich(&file("rx.png", &bytes), true).await.unwrap();
        assert_eq!(result.ocr.as_deref(), Some("<h3>Metformin</h3>"));
        assert_eq!(storage.fetch(&result.url).unwrap(), bytes.to_vec());
    }

    #[tokio::test]
    async fn ocr_disabled_yields_null_ocr() {
        let storage = Arc::new(MemoryStorage::new());
        let gateway = enricher(storage, MockOcrEngine::failing(), MockChatModel::failing());
        let result = gateway.enrich(&file("scan.jpg", b"jpeg"), false).await.unwrap();
        assert_eq!(result.ocr, None);
    }

    #[tokio::test]
    async fn pdf_skips_ocr_even_when_requested() {
        let storage = Arc::new(MemoryStorage::new());
        let gateway = enricher(storage, MockOcrEngine::failing(), MockChatModel::failing());
        let result = gateway.enrich(&file("labs.pdf", b"%PDF-1.4"), true).await.unwrap();
        assert!(result.url.contains("/raw/"));
        assert_eq!(result.ocr, None);
    }

    #[tokio::test]
    async fn upload_failure_stops_before_ocr() {
        let gateway = enricher(
            Arc::new(MemoryStorage::failing()),
            MockOcrEngine::new("never used"),
            MockChatModel::new("never used"),
        );
        let err = gateway.enrich(&file("rx.png", b"x"), true).await.unwrap_err();
        assert!(matches!(err, EnrichmentError::UploadFailed(_)));
    }

    #[tokio::test]
    async fn ocr_failure_is_distinguished() {
        let storage = Arc::new(MemoryStorage::new());
        let gateway = enricher(storage.clone(), MockOcrEngine::failing(), MockChatModel::new("x"));
        let err = gateway.enrich(&file("rx.png", b"x"), true).await.unwrap_err();
        assert!(matches!(err, EnrichmentError::OcrFailed(_)));
        // Upload already happened
        assert_eq!(storage.len(), 1);
    }

    #[tokio::test]
    async fn summary_failure_is_distinguished() {
        let gateway = enricher(
            Arc::new(MemoryStorage::new()),
            MockOcrEngine::new("text"),
            MockChatModel::failing(),
        );
        let err = gateway.enrich(&file("rx.png", b"x"), true).await.unwrap_err();
        assert!(matches!(err, EnrichmentError::SummaryFailed(_)));
    }

    #[tokio::test]
    async fn enrich_all_preserves_order_and_aborts_on_first_failure() {
        let storage = Arc::new(MemoryStorage::new());
        let gateway = enricher(storage.clone(), MockOcrEngine::new("t"), MockChatModel::new("s"));
        let files = vec![file("a.png", b"a"), file("b.pdf", b"b"), file("c.png", b"c")];
        let results = gateway.enrich_all(&files, false).await.unwrap();
        assert!(results[0].url.ends_with("/a.png"));
        assert!(results[1].url.ends_with("/b.pdf"));
        assert!(results[2].url.ends_with("/c.png"));

        let broken = enricher(
            Arc::new(MemoryStorage::new()),
            MockOcrEngine::failing(),
            MockChatModel::new("s"),
        );
        let files = vec![file("a.pdf", b"a"), file("b.png", b"b"), file("c.pdf", b"c")];
        assert!(broken.enrich_all(&files, true).await.is_err());
    }
}
