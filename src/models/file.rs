use serde::{Deserialize, Serialize};

/// A file received from a client, before enrichment.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Outcome of enriching one uploaded file.
///
/// `ocr` is always present on the wire: the language-model summary of the
/// extracted text, or `null` when OCR was not requested or not applicable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResult {
    pub url: String,
    pub ocr: Option<String>,
}

impl FileResult {
    pub fn bare(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ocr: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_result_serializes_null_ocr() {
        let json = serde_json::to_value(FileResult::bare("https://cdn/x.png")).unwrap();
        assert_eq!(json["url"], "https://cdn/x.png");
        assert!(json.get("ocr").unwrap().is_null());
    }
}
