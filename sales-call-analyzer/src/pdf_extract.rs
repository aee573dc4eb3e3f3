use anyhow::anyhow;
use lopdf::Document;
use tracing::{error, info, warn};

use crate::error::ExtractionError;
use crate::models::{PageWarning, Transcript};

/// The slice of a PDF library that transcript extraction relies on.
pub trait PdfDocument {
    fn is_encrypted(&self) -> bool;

    /// Page numbers in document order.
    fn page_numbers(&self) -> Vec<u32>;

    fn page_text(&self, page: u32) -> anyhow::Result<String>;
}

pub struct LopdfDocument {
    doc: Document,
}

impl LopdfDocument {
    pub fn load(bytes: &[u8]) -> Result<Self, ExtractionError> {
        match Document::load_mem(bytes) {
            Ok(doc) => Ok(Self { doc }),
            Err(e) => {
                let err_str = e.to_string();
                // lopdf refuses some encrypted files at load time
                let lowered = err_str.to_lowercase();
                if lowered.contains("encrypt") || lowered.contains("password") {
                    return Err(ExtractionError::EncryptedDocument);
                }
                Err(ExtractionError::MalformedDocument(err_str))
            }
        }
    }
}

impl PdfDocument for LopdfDocument {
    fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    fn page_numbers(&self) -> Vec<u32> {
        self.doc.get_pages().keys().copied().collect()
    }

    fn page_text(&self, page: u32) -> anyhow::Result<String> {
        Ok(self.doc.extract_text(&[page])?)
    }
}

/// Extract the transcript from raw PDF bytes on a blocking worker.
pub async fn extract_transcript(bytes: Vec<u8>) -> Result<Transcript, ExtractionError> {
    info!("Extracting text from PDF ({} bytes)", bytes.len());

    let transcript = tokio::task::spawn_blocking(move || extract(&bytes))
        .await
        .map_err(|e| {
            error!("PDF extraction worker failed: {}", e);
            ExtractionError::UnknownExtractionError(anyhow!("extraction worker failed: {}", e))
        })??;

    info!(
        "PDF text extraction successful: {} pages, {} characters",
        transcript.page_count,
        transcript.text.len()
    );
    Ok(transcript)
}

pub fn extract(bytes: &[u8]) -> Result<Transcript, ExtractionError> {
    let doc = LopdfDocument::load(bytes)?;
    extract_from_document(&doc)
}

/// Join the text of every page that extracts cleanly. A failing page becomes
/// a warning instead of aborting the document.
pub fn extract_from_document(doc: &dyn PdfDocument) -> Result<Transcript, ExtractionError> {
    if doc.is_encrypted() {
        error!("PDF is encrypted");
        return Err(ExtractionError::EncryptedDocument);
    }

    let pages = doc.page_numbers();
    let mut texts = Vec::with_capacity(pages.len());
    let mut warnings = Vec::new();

    for page in &pages {
        match doc.page_text(*page) {
            Ok(text) => {
                let text = text.trim_end();
                if !text.is_empty() {
                    texts.push(text.to_string());
                }
            }
            Err(e) => {
                warn!("Could not extract text from page {}: {}", page, e);
                warnings.push(PageWarning {
                    page: *page,
                    reason: e.to_string(),
                });
            }
        }
    }

    let text = texts.join("\n");
    if text.trim().is_empty() {
        warn!("No text extracted from PDF");
        return Err(ExtractionError::NoExtractableText);
    }

    Ok(Transcript {
        text,
        page_count: pages.len(),
        warnings,
    })
}
