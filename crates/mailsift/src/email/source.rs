//! Message selection and the mail source abstraction the scanner drives.

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use serde::Serialize;

use super::error::{EmailError, Result};

/// IMAP date format (e.g. "01-Jan-2024").
const IMAP_DATE_FORMAT: &str = "%d-%b-%Y";

/// Search issued against the selected folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchQuery {
    /// Every message in the folder.
    All,
    /// Messages dated from `start` through `end`, both inclusive.
    DateRange { start: NaiveDate, end: NaiveDate },
}

impl SearchQuery {
    /// Renders the query as an IMAP SEARCH string.
    ///
    /// IMAP `BEFORE` is exclusive, so the end date is pushed one day forward
    /// to keep messages dated on `end`.
    pub fn to_imap(&self) -> String {
        match self {
            SearchQuery::All => "ALL".to_string(),
            SearchQuery::DateRange { start, end } => {
                let before = end.checked_add_days(Days::new(1)).unwrap_or(*end);
                format!(
                    "SINCE {} BEFORE {}",
                    start.format(IMAP_DATE_FORMAT),
                    before.format(IMAP_DATE_FORMAT)
                )
            }
        }
    }
}

/// Which messages a scan looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum ScanMode {
    /// All messages, newest first.
    #[default]
    All,
    /// The newest `max_messages` messages.
    CountLimited { max_messages: usize },
    /// Messages dated within an inclusive range.
    DateLimited { start: NaiveDate, end: NaiveDate },
}

impl ScanMode {
    /// Checks the mode's bounds.
    pub fn validate(&self) -> Result<()> {
        match self {
            ScanMode::CountLimited { max_messages: 0 } => Err(EmailError::ConfigError(
                "message limit must be at least 1".to_string(),
            )),
            ScanMode::DateLimited { start, end } if start > end => {
                Err(EmailError::ConfigError(format!(
                    "start date {} is after end date {}",
                    start, end
                )))
            }
            _ => Ok(()),
        }
    }

    pub fn query(&self) -> SearchQuery {
        match self {
            ScanMode::All | ScanMode::CountLimited { .. } => SearchQuery::All,
            ScanMode::DateLimited { start, end } => SearchQuery::DateRange {
                start: *start,
                end: *end,
            },
        }
    }

    /// Maximum number of messages to examine, if bounded by count.
    pub fn max_messages(&self) -> Option<usize> {
        match self {
            ScanMode::CountLimited { max_messages } => Some(*max_messages),
            _ => None,
        }
    }
}

/// A mailbox the scanner can search and fetch from.
///
/// The scan runs on the calling task and is never spawned, so implementations
/// do not need to be `Send`.
#[async_trait(?Send)]
pub trait MailSource {
    /// Returns the UIDs matching `query` in the selected folder.
    async fn search(&mut self, query: &SearchQuery) -> Result<Vec<u32>>;

    /// Fetches the full raw content of one message.
    async fn fetch(&mut self, uid: u32) -> Result<Vec<u8>>;

    /// Closes the folder and ends the session.
    async fn close(&mut self) -> Result<()>;
}
