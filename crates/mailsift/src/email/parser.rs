//! Email parsing and PDF attachment extraction.

use log::debug;
use mail_parser::{Message, MessageParser, MessagePart, MimeHeaders, PartType};

use crate::sanitize::sanitize_filename;

use super::error::{EmailError, Result};

/// Reporting fields of a parsed message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailInfo {
    /// The decoded Subject header.
    pub subject: Option<String>,
    /// The Date header in RFC 3339 form.
    pub date: Option<String>,
}

/// A PDF attachment extracted from an email.
#[derive(Debug, Clone)]
pub struct ExtractedAttachment {
    /// The attachment's filename (sanitized).
    pub filename: String,
    /// The attachment's decoded content.
    pub content: Vec<u8>,
}

/// A message reduced to what the scanner needs.
#[derive(Debug, Clone)]
pub struct ParsedEmail {
    pub info: EmailInfo,
    /// PDF attachments in message order.
    pub attachments: Vec<ExtractedAttachment>,
}

/// Parser for extracting PDF attachments from raw messages.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmailParser;

impl EmailParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses a raw RFC 5322 message and collects its PDF attachments.
    ///
    /// Only parts with an `attachment` disposition and a filename ending in
    /// `.pdf` (any case) qualify. Non-multipart messages have none.
    pub fn parse(&self, raw_email: &[u8]) -> Result<ParsedEmail> {
        let message = MessageParser::default()
            .parse(raw_email)
            .ok_or_else(|| EmailError::ParseError("Failed to parse email message".to_string()))?;

        let info = extract_email_info(&message);
        debug!(
            "Parsing email subject={:?}",
            info.subject.as_deref().unwrap_or("(no subject)")
        );

        if !is_multipart(&message) {
            debug!("Email is not multipart, no attachments");
            return Ok(ParsedEmail {
                info,
                attachments: Vec::new(),
            });
        }

        let mut attachments = Vec::new();
        for part in message.parts.iter().skip(1) {
            if !is_attachment(part) {
                continue;
            }

            let Some(name) = part.attachment_name() else {
                debug!("Skipping attachment without filename");
                continue;
            };

            if !is_pdf_filename(name) {
                debug!("Skipping non-PDF attachment '{}'", name);
                continue;
            }

            let content = match &part.body {
                PartType::Binary(data) | PartType::InlineBinary(data) => data.to_vec(),
                PartType::Text(text) => text.as_bytes().to_vec(),
                PartType::Html(html) => html.as_bytes().to_vec(),
                _ => continue,
            };

            let filename = sanitize_filename(name);
            debug!("Found attachment: {} ({} bytes)", filename, content.len());
            attachments.push(ExtractedAttachment { filename, content });
        }

        debug!("Extracted {} PDF attachments", attachments.len());
        Ok(ParsedEmail { info, attachments })
    }
}

/// Returns true for filenames with a `.pdf` extension, ignoring case.
pub fn is_pdf_filename(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".pdf")
}

fn extract_email_info(message: &Message) -> EmailInfo {
    EmailInfo {
        subject: message.subject().map(|s| s.to_string()),
        date: message.date().map(|d| d.to_rfc3339()),
    }
}

fn is_multipart(message: &Message) -> bool {
    message
        .parts
        .first()
        .is_some_and(|root| matches!(root.body, PartType::Multipart(_)))
}

fn is_attachment(part: &MessagePart) -> bool {
    part.content_disposition()
        .is_some_and(|disposition| disposition.ctype().eq_ignore_ascii_case("attachment"))
}
