pub mod archive;
pub mod config;
pub mod criteria;
pub mod email;
pub mod error;
pub mod logging;
pub mod processor;
pub mod report;
pub mod sanitize;
pub mod secrets;
pub mod storage;

pub use archive::{ArchiveBuilder, Bundle};
pub use config::{load_settings, FormInput, Settings};
pub use criteria::{Criteria, Evaluation};
pub use email::{ImapCredentials, MailSource, MailboxScanner, ScanMode, SearchQuery};
pub use error::{
    ArchiveError, ConfigError, MailsiftError, ProcessError, Result, StorageError,
};
pub use report::{ItemOutcome, MessageFailure, MessageSummary, ScanOutcome, ScanReport};
pub use secrets::{resolve_secret, SecretError};
