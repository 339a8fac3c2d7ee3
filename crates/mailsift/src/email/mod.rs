//! Email source module.
//!
//! Connects to an IMAP inbox, pulls PDF attachments out of the selected
//! messages and runs them through the criteria, newest message first.

pub mod client;
pub mod error;
pub mod parser;
pub mod scanner;
pub mod source;

pub use client::{ImapClient, ImapCredentials};
pub use error::EmailError;
pub use parser::{EmailInfo, EmailParser, ExtractedAttachment, ParsedEmail};
pub use scanner::MailboxScanner;
pub use source::{MailSource, ScanMode, SearchQuery};
