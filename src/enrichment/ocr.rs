//! Optical text extraction for stored images (OCR.space).

use async_trait::async_trait;
use reqwest::multipart::Form;
use serde::Deserialize;

use super::EnrichmentError;

/// OCR.space engine tuned for printed and handwritten text.
const OCR_ENGINE: &str = "5";

#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Extract the text of the image stored at `url`.
    async fn extract_text(&self, url: &str) -> Result<String, EnrichmentError>;
}

pub struct OcrSpaceClient {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl OcrSpaceClient {
    pub fn new(endpoint: &str, api_key: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrSpaceResponse {
    #[serde(default)]
    parsed_results: Vec<ParsedResult>,
    #[serde(default)]
    is_errored_on_processing: bool,
    #[serde(default)]
    error_message: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParsedResult {
    #[serde(default)]
    parsed_text: String,
}

/// Take the first parsed result's text out of an OCR.space response body.
fn first_parsed_text(body: &str) -> Result<String, EnrichmentError> {
    let parsed: OcrSpaceResponse = serde_json::from_str(body)
        .map_err(|e| EnrichmentError::OcrFailed(format!("unreadable response: {e}")))?;

    if parsed.is_errored_on_processing {
        let detail = parsed
            .error_message
            .map(|m| m.to_string())
            .unwrap_or_else(|| "unknown error".into());
        return Err(EnrichmentError::OcrFailed(detail));
    }

    parsed
        .parsed_results
        .into_iter()
        .next()
        .map(|r| r.parsed_text)
        .ok_or_else(|| EnrichmentError::OcrFailed("no parsed results".into()))
}

#[async_trait]
impl OcrEngine for OcrSpaceClient {
    async fn extract_text(&self, url: &str) -> Result<String, EnrichmentError> {
        let form = Form::new()
            .text("url", url.to_string())
            .text("OCREngine", OCR_ENGINE)
            .text("filetype", "PNG");

        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| EnrichmentError::OcrFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| EnrichmentError::OcrFailed(e.to_string()))?;
        if !status.is_success() {
            return Err(EnrichmentError::OcrFailed(format!(
                "OCR provider returned {status}: {body}"
            )));
        }

        first_parsed_text(&body)
    }
}

/// OCR engine that returns a fixed text, or always fails.
pub struct MockOcrEngine {
    text: Option<String>,
}

impl MockOcrEngine {
    pub fn new(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { text: None }
    }
}

#[async_trait]
impl OcrEngine for MockOcrEngine {
    async fn extract_text(&self, _url: &str) -> Result<String, EnrichmentError> {
        self.text
            .clone()
            .ok_or_else(|| EnrichmentError::OcrFailed("mock OCR failure".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_first_parsed_text() {
        let body = r#"{
            "ParsedResults": [
                {"ParsedText": "Amoxicillin 500mg", "FileParseExitCode": 1},
                {"ParsedText": "ignored"}
            ],
            "OCRExitCode": 1,
            "IsErroredOnProcessing": false
        }"#;
        assert_eq!(first_parsed_text(body).unwrap(), "Amoxicillin 500mg");
    }

    #[test]
    fn processing_error_is_ocr_failure() {
        let body = r#"{
            "OCRExitCode": 99,
            "IsErroredOnProcessing": true,
            "ErrorMessage": ["Unable to recognize the file type"]
        }"#;
        let err = first_parsed_text(body).unwrap_err();
        assert!(matches!(err, EnrichmentError::OcrFailed(msg) if msg.contains("recognize")));
    }

    #[test]
    fn empty_results_is_ocr_failure() {
        let err = first_parsed_text(r#"{"ParsedResults": []}"#).unwrap_err();
        assert!(matches!(err, EnrichmentError::OcrFailed(_)));
    }

    #[test]
    fn garbage_body_is_ocr_failure() {
        assert!(first_parsed_text("<html>").is_err());
    }
}
