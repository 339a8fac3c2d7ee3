use std::path::Path;

use crate::error::ProcessError;
use crate::processor::{DocumentProcessor, ExtractedDocument};
use crate::sanitize::redact_path;

/// Extracts text and page count from PDFs with lopdf.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfProcessor;

impl PdfProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentProcessor for PdfProcessor {
    fn process(&self, path: &Path) -> Result<ExtractedDocument, ProcessError> {
        let _span = tracing::info_span!("processor.pdf", file = %redact_path(path)).entered();

        let pdf_bytes = std::fs::read(path).map_err(|e| ProcessError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        let doc = lopdf::Document::load_mem(&pdf_bytes)
            .map_err(|e| ProcessError::PdfProcessing(format!("Failed to load PDF: {}", e)))?;

        let page_count = doc.get_pages().len();
        let text = extract_text_from_pdf(&doc);

        tracing::debug!(page_count, chars = text.len(), "Extracted PDF text");
        Ok(ExtractedDocument { text, page_count })
    }
}

/// Concatenates the text of every page.
///
/// Pages whose text cannot be decoded contribute nothing; the page still counts.
fn extract_text_from_pdf(doc: &lopdf::Document) -> String {
    let mut text = String::new();

    for (page_num, _) in doc.get_pages() {
        match doc.extract_text(&[page_num]) {
            Ok(page_text) => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Err(e) => tracing::debug!("No text on page {}: {}", page_num, e),
        }
    }

    text
}
