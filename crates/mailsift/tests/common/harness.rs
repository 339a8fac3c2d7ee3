//! Test harness for isolated scans.
//!
//! `TestHarness` owns a temp directory used as the scan's base directory, so
//! the working directory and archive land somewhere disposable. `FakeMailbox`
//! stands in for the IMAP server.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use tempfile::TempDir;

use mailsift::email::EmailError;
use mailsift::{Criteria, MailSource, MailboxScanner, ScanMode, SearchQuery, Settings};

/// In-memory mailbox that records every call made against it.
#[derive(Default)]
pub struct FakeMailbox {
    messages: Vec<(u32, NaiveDate, Vec<u8>)>,
    unfetchable: HashSet<u32>,
    fail_search: bool,
    /// Queries received, in order.
    pub queries: Vec<SearchQuery>,
    /// UIDs fetched, in order.
    pub fetched: Vec<u32>,
    /// Set once `close` has been called.
    pub closed: bool,
}

impl FakeMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message dated 2024-01-09.
    pub fn with_message(self, uid: u32, raw: Vec<u8>) -> Self {
        let date = NaiveDate::from_ymd_opt(2024, 1, 9).expect("valid date");
        self.with_dated_message(uid, date, raw)
    }

    /// Add a message with an explicit internal date.
    pub fn with_dated_message(mut self, uid: u32, date: NaiveDate, raw: Vec<u8>) -> Self {
        self.messages.push((uid, date, raw));
        self
    }

    /// Make fetching `uid` fail even though search reports it.
    pub fn with_unfetchable(mut self, uid: u32) -> Self {
        self.unfetchable.insert(uid);
        self
    }

    /// Make every search fail.
    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }
}

#[async_trait(?Send)]
impl MailSource for FakeMailbox {
    async fn search(&mut self, query: &SearchQuery) -> Result<Vec<u32>, EmailError> {
        self.queries.push(*query);
        if self.fail_search {
            return Err(EmailError::ProtocolError("SEARCH rejected".to_string()));
        }

        let uids = self
            .messages
            .iter()
            .filter(|(_, date, _)| match query {
                SearchQuery::All => true,
                SearchQuery::DateRange { start, end } => date >= start && date <= end,
            })
            .map(|(uid, _, _)| *uid)
            .collect();
        Ok(uids)
    }

    async fn fetch(&mut self, uid: u32) -> Result<Vec<u8>, EmailError> {
        self.fetched.push(uid);
        if self.unfetchable.contains(&uid) {
            return Err(EmailError::MessageNotFound(uid));
        }
        self.messages
            .iter()
            .find(|(id, _, _)| *id == uid)
            .map(|(_, _, raw)| raw.clone())
            .ok_or(EmailError::MessageNotFound(uid))
    }

    async fn close(&mut self) -> Result<(), EmailError> {
        self.closed = true;
        Ok(())
    }
}

/// Isolated environment for running scans.
pub struct TestHarness {
    temp_dir: TempDir,
    pub settings: Settings,
}

impl TestHarness {
    /// Create a new harness with default settings rooted in a temp directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let settings = Settings {
            base_dir: temp_dir.path().to_path_buf(),
            ..Settings::default()
        };
        Self { temp_dir, settings }
    }

    /// Set the page limit used by `scanner`.
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.settings.max_pages = max_pages;
        self
    }

    /// Build a scanner for the given filter inputs.
    pub fn scanner(&self, keywords: &[&str], terms: &[&str], mode: ScanMode) -> MailboxScanner {
        let criteria = Criteria::new(keywords.iter().copied(), terms.iter().copied())
            .with_max_pages(self.settings.max_pages);
        MailboxScanner::new(self.settings.clone(), criteria, mode)
    }

    /// A scanner using the default CV terms and no keywords.
    pub fn default_scanner(&self, mode: ScanMode) -> MailboxScanner {
        self.scanner(&[], &["experience", "education", "skills"], mode)
    }

    pub fn work_dir(&self) -> PathBuf {
        self.settings.work_dir()
    }

    pub fn archive_path(&self) -> PathBuf {
        self.settings.archive_path()
    }

    /// A path inside the temp directory, outside the scan's own files.
    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }
}
