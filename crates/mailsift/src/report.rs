//! What a scan did, message by message.

use serde::Serialize;

use crate::archive::Bundle;

/// Outcome for one PDF attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ItemOutcome {
    /// Passed the criteria; `filename` is the name it was stored and archived under.
    Kept { filename: String },
    /// Failed the criteria and was deleted.
    Discarded { filename: String, reason: String },
    /// Could not be read as a PDF; treated as discarded.
    ParseError { filename: String, error: String },
    /// Could not be written to the working directory.
    SaveError { filename: String, error: String },
}

impl ItemOutcome {
    pub fn filename(&self) -> &str {
        match self {
            ItemOutcome::Kept { filename }
            | ItemOutcome::Discarded { filename, .. }
            | ItemOutcome::ParseError { filename, .. }
            | ItemOutcome::SaveError { filename, .. } => filename,
        }
    }

    pub fn is_kept(&self) -> bool {
        matches!(self, ItemOutcome::Kept { .. })
    }
}

/// One examined message and what happened to its attachments.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSummary {
    pub uid: u32,
    pub subject: Option<String>,
    pub date: Option<String>,
    pub attachments: Vec<ItemOutcome>,
}

/// A message that could not be fetched or parsed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageFailure {
    pub uid: u32,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub messages: Vec<MessageSummary>,
    pub failures: Vec<MessageFailure>,
    /// Set when the search itself failed and the scan continued as empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_error: Option<String>,
}

impl ScanReport {
    /// Messages examined, including those that failed.
    pub fn messages_examined(&self) -> usize {
        self.messages.len() + self.failures.len()
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.messages.iter().flat_map(|m| m.attachments.iter())
    }

    pub fn kept(&self) -> impl Iterator<Item = &str> {
        self.outcomes()
            .filter(|o| o.is_kept())
            .map(ItemOutcome::filename)
    }

    /// Filenames of everything that was not kept, including unreadable PDFs.
    pub fn discarded(&self) -> impl Iterator<Item = &str> {
        self.outcomes()
            .filter(|o| !o.is_kept())
            .map(ItemOutcome::filename)
    }

    pub fn kept_count(&self) -> usize {
        self.kept().count()
    }
}

/// Result of a scan.
#[derive(Debug)]
pub enum ScanOutcome {
    /// Nothing matched; no archive was produced.
    Empty(ScanReport),
    /// At least one attachment was kept and bundled.
    Found { bundle: Bundle, report: ScanReport },
}

impl ScanOutcome {
    pub fn report(&self) -> &ScanReport {
        match self {
            ScanOutcome::Empty(report) | ScanOutcome::Found { report, .. } => report,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ScanOutcome::Empty(_))
    }
}
