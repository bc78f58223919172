/// Plain-text extraction for uploaded documents.
///
/// The file extension selects a [`DocumentKind`]; each supported kind has one
/// extraction strategy.
use std::path::Path;

use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("invalid PDF: {0}")]
    Pdf(String),

    #[error("text is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("extraction task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
    /// Holds the offending extension including its leading dot (empty if none).
    Unsupported(String),
}

impl DocumentKind {
    /// Classify a file by its extension, case-insensitively.
    pub fn from_filename(filename: &str) -> Self {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match ext.as_deref() {
            Some("pdf") => DocumentKind::Pdf,
            Some("txt") => DocumentKind::PlainText,
            Some(other) => DocumentKind::Unsupported(format!(".{other}")),
            None => DocumentKind::Unsupported(String::new()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::PlainText => "text",
            DocumentKind::Unsupported(_) => "unsupported",
        }
    }
}

/// Decode UTF-8 text, dropping a leading byte-order mark.
pub fn decode_utf8(bytes: Vec<u8>) -> Result<String, ExtractError> {
    let text = String::from_utf8(bytes)?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

/// Extract text from every page of a PDF, in page order, one page per line block.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let document = lopdf::Document::load_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;

    let pages = document.get_pages();
    debug!(pages = pages.len(), "extracting PDF text");

    let mut text = String::new();
    for page_number in pages.keys() {
        let page_text = document
            .extract_text(&[*page_number])
            .map_err(|e| ExtractError::Pdf(format!("page {page_number}: {e}")))?;
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&page_text);
    }

    Ok(text)
}

/// Extract plain text for a supported kind.
///
/// PDF parsing is CPU-bound and runs on the blocking pool.
pub async fn extract_text(kind: &DocumentKind, bytes: Vec<u8>) -> Result<String, ExtractError> {
    match kind {
        DocumentKind::PlainText => decode_utf8(bytes),
        DocumentKind::Pdf => tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
            .await
            .map_err(|e| ExtractError::Task(e.to_string()))?,
        DocumentKind::Unsupported(ext) => {
            Err(ExtractError::Task(format!("no extractor for '{ext}'")))
        }
    }
}
