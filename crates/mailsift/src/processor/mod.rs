pub mod pdf;

use std::path::Path;

use crate::error::ProcessError;

pub use pdf::PdfProcessor;

/// Text and page count of a loaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    /// Concatenation of every page's text, one page per line block.
    pub text: String,
    pub page_count: usize,
}

pub trait DocumentProcessor: Send + Sync {
    fn process(&self, path: &Path) -> Result<ExtractedDocument, ProcessError>;
}
