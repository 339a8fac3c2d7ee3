//! Mailbox scanner that drives fetching, extraction, filtering and bundling.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::archive::ArchiveBuilder;
use crate::config::Settings;
use crate::criteria::Criteria;
use crate::error::Result;
use crate::processor::{DocumentProcessor, PdfProcessor};
use crate::report::{ItemOutcome, MessageFailure, MessageSummary, ScanOutcome, ScanReport};
use crate::storage::WorkingDirectory;

use super::client::{ImapClient, ImapCredentials};
use super::error::Result as EmailResult;
use super::parser::{EmailParser, ExtractedAttachment};
use super::source::{MailSource, ScanMode};

/// Runs one scan: search, fetch newest first, keep or discard each PDF, bundle.
pub struct MailboxScanner {
    settings: Settings,
    criteria: Criteria,
    mode: ScanMode,
    parser: EmailParser,
    processor: Box<dyn DocumentProcessor>,
}

impl MailboxScanner {
    pub fn new(settings: Settings, criteria: Criteria, mode: ScanMode) -> Self {
        Self {
            settings,
            criteria,
            mode,
            parser: EmailParser::new(),
            processor: Box::new(PdfProcessor::new()),
        }
    }

    /// Replaces the PDF processor.
    pub fn with_processor(mut self, processor: Box<dyn DocumentProcessor>) -> Self {
        self.processor = processor;
        self
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// Connects to the configured IMAP server and scans it.
    ///
    /// Connection and authentication failures abort the scan.
    pub async fn run(&self, credentials: ImapCredentials) -> Result<ScanOutcome> {
        self.mode.validate()?;

        let mut client = ImapClient::new(&self.settings, credentials);
        client.connect().await?;

        self.scan_source(&mut client).await
    }

    /// Scans an already connected mail source.
    ///
    /// The source is closed before returning, whatever the result. On return
    /// the working directory is gone; the archive lives until the returned
    /// bundle is delivered or dropped.
    pub async fn scan_source<S: MailSource + ?Sized>(&self, source: &mut S) -> Result<ScanOutcome> {
        let span = info_span!("email_scan", mode = ?self.mode);

        async {
            let collected = self.collect(source).await;

            if let Err(e) = source.close().await {
                warn!("Failed to close mail session: {}", e);
            }

            collected.and_then(|(report, kept, workdir)| self.finish(report, kept, workdir))
        }
        .instrument(span)
        .await
    }

    async fn collect<S: MailSource + ?Sized>(
        &self,
        source: &mut S,
    ) -> Result<(ScanReport, Vec<PathBuf>, WorkingDirectory)> {
        self.mode.validate()?;

        let workdir = WorkingDirectory::create(self.settings.work_dir())?;
        let mut report = ScanReport::default();
        let mut kept = Vec::new();

        let query = self.mode.query();
        let mut uids = match source.search(&query).await {
            Ok(uids) => uids,
            Err(e) => {
                warn!("Search '{}' failed, treating as empty: {}", query.to_imap(), e);
                report.search_error = Some(e.to_string());
                Vec::new()
            }
        };

        // Newest first
        uids.sort_unstable_by(|a, b| b.cmp(a));
        uids.dedup();
        if let Some(limit) = self.mode.max_messages() {
            uids.truncate(limit);
        }

        info!("Examining {} messages", uids.len());

        for uid in uids {
            let raw_email = match source.fetch(uid).await {
                Ok(raw) => raw,
                Err(e) => {
                    error!("Failed to fetch email UID {}: {}", uid, e);
                    report.failures.push(MessageFailure {
                        uid,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            match self.process_email(uid, &raw_email, &workdir, &mut kept) {
                Ok(summary) => report.messages.push(summary),
                Err(e) => {
                    error!("Failed to process email UID {}: {}", uid, e);
                    report.failures.push(MessageFailure {
                        uid,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok((report, kept, workdir))
    }

    /// Extracts and evaluates every PDF in one message.
    fn process_email(
        &self,
        uid: u32,
        raw_email: &[u8],
        workdir: &WorkingDirectory,
        kept: &mut Vec<PathBuf>,
    ) -> EmailResult<MessageSummary> {
        let parsed = self.parser.parse(raw_email)?;

        info!(
            uid,
            subject = parsed.info.subject.as_deref().unwrap_or("(no subject)"),
            date = parsed.info.date.as_deref().unwrap_or("(no date)"),
            attachments = parsed.attachments.len(),
            "Processing email"
        );

        let attachments = parsed
            .attachments
            .iter()
            .map(|attachment| {
                let (outcome, path) = self.process_attachment(attachment, workdir);
                kept.extend(path);
                outcome
            })
            .collect();

        Ok(MessageSummary {
            uid,
            subject: parsed.info.subject,
            date: parsed.info.date,
            attachments,
        })
    }

    /// Saves one attachment, evaluates it, and deletes it unless kept.
    fn process_attachment(
        &self,
        attachment: &ExtractedAttachment,
        workdir: &WorkingDirectory,
    ) -> (ItemOutcome, Option<PathBuf>) {
        let filename = attachment.filename.clone();

        let path = match workdir.store(&attachment.filename, &attachment.content) {
            Ok(path) => path,
            Err(e) => {
                error!("Failed to save attachment '{}': {}", filename, e);
                return (
                    ItemOutcome::SaveError {
                        filename,
                        error: e.to_string(),
                    },
                    None,
                );
            }
        };

        let outcome = match self.processor.process(&path) {
            Ok(document) => {
                let evaluation = self.criteria.evaluation(&document.text, document.page_count);
                match evaluation.rejection_reason() {
                    None => {
                        debug!("Keeping '{}' ({} pages)", filename, document.page_count);
                        return (
                            ItemOutcome::Kept {
                                filename: stored_name(&path, &filename),
                            },
                            Some(path),
                        );
                    }
                    Some(reason) => {
                        debug!("Discarding '{}': {}", filename, reason);
                        ItemOutcome::Discarded { filename, reason }
                    }
                }
            }
            Err(e) => {
                warn!("Error processing '{}': {}", filename, e);
                ItemOutcome::ParseError {
                    filename,
                    error: e.to_string(),
                }
            }
        };

        if let Err(e) = workdir.discard(&path) {
            warn!("Failed to delete discarded attachment: {}", e);
        }
        (outcome, None)
    }

    /// Archives the kept files, then removes the working directory.
    fn finish(
        &self,
        report: ScanReport,
        kept: Vec<PathBuf>,
        workdir: WorkingDirectory,
    ) -> Result<ScanOutcome> {
        if kept.is_empty() {
            workdir.remove()?;
            info!(
                "No matching attachments in {} examined messages",
                report.messages_examined()
            );
            return Ok(ScanOutcome::Empty(report));
        }

        let bundle = ArchiveBuilder::new(self.settings.archive_path()).build(&kept)?;
        workdir.remove()?;

        info!(
            "Scan complete: kept {} of {} attachments",
            bundle.file_count(),
            report.outcomes().count()
        );
        Ok(ScanOutcome::Found { bundle, report })
    }
}

fn stored_name(path: &Path, fallback: &str) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(fallback)
        .to_string()
}
