//! Bundling of kept attachments into a single zip file.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ArchiveError;
use crate::storage::move_file;

/// Writes kept files into one deflate-compressed zip.
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    path: PathBuf,
}

impl ArchiveBuilder {
    /// `path` is where the archive will be written.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Zips `files` under their base names and returns the resulting bundle.
    ///
    /// Directory structure is flattened. Fails on an empty list or when two
    /// files share a base name.
    pub fn build(&self, files: &[PathBuf]) -> Result<Bundle, ArchiveError> {
        if files.is_empty() {
            return Err(ArchiveError::NothingToArchive);
        }

        let mut names = HashSet::new();
        let mut entries = Vec::with_capacity(files.len());
        for file in files {
            let name = file
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| ArchiveError::InvalidEntry(file.clone()))?;
            if !names.insert(name) {
                return Err(ArchiveError::DuplicateEntry(name.to_string()));
            }
            entries.push((file, name));
        }

        let io_err = |source: std::io::Error| ArchiveError::Io {
            path: self.path.clone(),
            source,
        };

        // Dropped on error paths below, which removes the partial archive
        let mut bundle = Bundle::new(self.path.clone(), entries.len());

        let archive = File::create(&self.path).map_err(io_err)?;
        let mut zip = ZipWriter::new(archive);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (file, name) in entries {
            zip.start_file(name.to_string(), options)?;
            let mut source = File::open(file).map_err(|source| ArchiveError::Io {
                path: file.clone(),
                source,
            })?;
            std::io::copy(&mut source, &mut zip).map_err(io_err)?;
        }
        zip.finish()?;

        bundle.written = true;
        info!(
            "Created archive {} with {} files",
            self.path.display(),
            bundle.file_count
        );
        Ok(bundle)
    }
}

/// A finished archive waiting to be downloaded.
///
/// The archive file is deleted once it has been delivered, or on drop.
#[derive(Debug)]
pub struct Bundle {
    path: PathBuf,
    file_count: usize,
    written: bool,
    released: bool,
}

impl Bundle {
    fn new(path: PathBuf, file_count: usize) -> Self {
        Self {
            path,
            file_count,
            written: false,
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of files in the archive.
    pub fn file_count(&self) -> usize {
        self.file_count
    }

    /// Reads the archive into memory and deletes the file.
    pub fn into_bytes(mut self) -> Result<Vec<u8>, ArchiveError> {
        let bytes = std::fs::read(&self.path).map_err(|source| ArchiveError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.release();
        Ok(bytes)
    }

    /// Moves the archive to `dest`, leaving nothing at the original path.
    pub fn deliver_to<P: AsRef<Path>>(mut self, dest: P) -> Result<PathBuf, ArchiveError> {
        let dest = dest.as_ref().to_path_buf();
        if dest != self.path {
            move_file(&self.path, &dest).map_err(|source| ArchiveError::MoveFile {
                from: self.path.clone(),
                to: dest.clone(),
                source,
            })?;
        }
        // From here on the caller owns the file
        self.released = true;
        info!("Archive delivered to {}", dest.display());
        Ok(dest)
    }

    fn release(&mut self) {
        self.released = true;
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove archive {}: {}", self.path.display(), e);
            }
        }
    }
}

impl Drop for Bundle {
    fn drop(&mut self) {
        if !self.released {
            if !self.written {
                warn!("Discarding incomplete archive {}", self.path.display());
            }
            self.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    fn write_files(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|name| {
                let path = dir.join(name);
                std::fs::write(&path, format!("content of {}", name)).unwrap();
                path
            })
            .collect()
    }

    fn entry_names(path: &Path) -> Vec<String> {
        let archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(|n| n.to_string()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_build_contains_every_file_by_base_name() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("email_attachments");
        std::fs::create_dir(&nested).unwrap();
        let files = write_files(&nested, &["a.pdf", "b.pdf", "c.pdf"]);

        let bundle = ArchiveBuilder::new(temp.path().join("cv_files.zip"))
            .build(&files)
            .unwrap();

        assert_eq!(bundle.file_count(), 3);
        assert_eq!(entry_names(bundle.path()), vec!["a.pdf", "b.pdf", "c.pdf"]);
    }

    #[test]
    fn test_entry_content_round_trips() {
        let temp = TempDir::new().unwrap();
        let files = write_files(temp.path(), &["cv.pdf"]);

        let bundle = ArchiveBuilder::new(temp.path().join("out.zip"))
            .build(&files)
            .unwrap();

        let mut archive = zip::ZipArchive::new(File::open(bundle.path()).unwrap()).unwrap();
        let mut content = String::new();
        archive
            .by_name("cv.pdf")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "content of cv.pdf");
    }

    #[test]
    fn test_empty_input_produces_no_archive() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cv_files.zip");

        let result = ArchiveBuilder::new(&path).build(&[]);
        assert!(matches!(result, Err(ArchiveError::NothingToArchive)));
        assert!(!path.exists());
    }

    #[test]
    fn test_duplicate_base_names_rejected() {
        let temp = TempDir::new().unwrap();
        let one = temp.path().join("one");
        let two = temp.path().join("two");
        std::fs::create_dir(&one).unwrap();
        std::fs::create_dir(&two).unwrap();
        let mut files = write_files(&one, &["cv.pdf"]);
        files.extend(write_files(&two, &["cv.pdf"]));

        let path = temp.path().join("cv_files.zip");
        let result = ArchiveBuilder::new(&path).build(&files);
        assert!(matches!(result, Err(ArchiveError::DuplicateEntry(name)) if name == "cv.pdf"));
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_source_removes_partial_archive() {
        let temp = TempDir::new().unwrap();
        let files = vec![temp.path().join("missing.pdf")];
        let path = temp.path().join("cv_files.zip");

        let result = ArchiveBuilder::new(&path).build(&files);
        assert!(matches!(result, Err(ArchiveError::Io { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_deletes_archive() {
        let temp = TempDir::new().unwrap();
        let files = write_files(temp.path(), &["cv.pdf"]);
        let path = temp.path().join("cv_files.zip");

        let bundle = ArchiveBuilder::new(&path).build(&files).unwrap();
        assert!(path.exists());
        drop(bundle);
        assert!(!path.exists());
    }

    #[test]
    fn test_into_bytes_deletes_archive() {
        let temp = TempDir::new().unwrap();
        let files = write_files(temp.path(), &["cv.pdf"]);
        let path = temp.path().join("cv_files.zip");

        let bytes = ArchiveBuilder::new(&path)
            .build(&files)
            .unwrap()
            .into_bytes()
            .unwrap();
        assert!(bytes.starts_with(b"PK"));
        assert!(!path.exists());
    }

    #[test]
    fn test_deliver_to_moves_archive() {
        let temp = TempDir::new().unwrap();
        let files = write_files(temp.path(), &["cv.pdf"]);
        let path = temp.path().join("cv_files.zip");
        let dest = temp.path().join("download.zip");

        let delivered = ArchiveBuilder::new(&path)
            .build(&files)
            .unwrap()
            .deliver_to(&dest)
            .unwrap();

        assert_eq!(delivered, dest);
        assert!(dest.exists());
        assert!(!path.exists());
        assert_eq!(entry_names(&dest), vec!["cv.pdf"]);
    }
}
