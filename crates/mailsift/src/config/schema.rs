use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::criteria::DEFAULT_MAX_PAGES;

/// Server and filesystem settings for a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// IMAP server hostname.
    #[serde(default = "default_host")]
    pub host: String,

    /// IMAP server port (default: 993 for IMAPS).
    #[serde(default = "default_imap_port")]
    pub port: u16,

    /// IMAP folder to scan (default: "INBOX").
    #[serde(default = "default_inbox")]
    pub folder: String,

    /// Directory holding the working directory and the archive.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Name of the attachment working directory under `base_dir`.
    #[serde(default = "default_work_dir_name")]
    pub work_dir_name: String,

    /// Name of the archive file under `base_dir`.
    #[serde(default = "default_archive_name")]
    pub archive_name: String,

    /// Documents with more pages are discarded.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

impl Settings {
    pub fn work_dir(&self) -> PathBuf {
        self.base_dir.join(&self.work_dir_name)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.base_dir.join(&self.archive_name)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_imap_port(),
            folder: default_inbox(),
            base_dir: default_base_dir(),
            work_dir_name: default_work_dir_name(),
            archive_name: default_archive_name(),
            max_pages: default_max_pages(),
        }
    }
}

fn default_host() -> String {
    "imap.gmail.com".to_string()
}

fn default_imap_port() -> u16 {
    993
}

fn default_inbox() -> String {
    "INBOX".to_string()
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_work_dir_name() -> String {
    "email_attachments".to_string()
}

fn default_archive_name() -> String {
    "cv_files.zip".to_string()
}

fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}
