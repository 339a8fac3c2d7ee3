use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::StorageError;
use crate::sanitize::MAX_FILENAME_LEN;

use super::remove_file_if_exists;

/// Highest numbered variant tried before giving up on a filename.
const MAX_NAME_VARIANTS: usize = 1000;

/// Directory that holds extracted attachments for the duration of one scan.
///
/// The directory is created on construction and removed recursively by
/// [`WorkingDirectory::remove`] or, failing that, on drop.
#[derive(Debug)]
pub struct WorkingDirectory {
    path: PathBuf,
    removed: bool,
}

impl WorkingDirectory {
    /// Creates the directory (and parents) if it does not exist yet.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&path).map_err(|e| StorageError::CreateDirectory {
            path: path.clone(),
            source: e,
        })?;
        debug!("Working directory ready at {}", path.display());

        Ok(Self {
            path,
            removed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `content` under `filename`, never overwriting an existing file.
    ///
    /// When the name is taken a numbered variant (`cv_2.pdf`, `cv_3.pdf`, ...)
    /// is used. Returns the path actually written.
    pub fn store(&self, filename: &str, content: &[u8]) -> Result<PathBuf, StorageError> {
        let (base, ext) = match filename.rfind('.') {
            Some(dot_pos) if dot_pos > 0 => (&filename[..dot_pos], Some(&filename[dot_pos..])),
            _ => (filename, None),
        };

        for counter in 1..=MAX_NAME_VARIANTS {
            let try_filename = if counter == 1 {
                filename.to_string()
            } else {
                numbered_variant(base, ext.unwrap_or(""), counter)
            };

            let try_path = self.path.join(&try_filename);

            // create_new fails if the file exists: atomic check-and-create
            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&try_path)
            {
                Ok(file) => {
                    write_or_remove(file, &try_path, content)?;
                    debug!("Saved {} ({} bytes)", try_path.display(), content.len());
                    return Ok(try_path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(StorageError::WriteFile {
                        path: try_path,
                        source: e,
                    });
                }
            }
        }

        Err(StorageError::FileExists(self.path.join(filename)))
    }

    /// Deletes a file that was stored here.
    pub fn discard(&self, path: &Path) -> Result<(), StorageError> {
        remove_file_if_exists(path)
    }

    /// Removes the directory and everything in it.
    pub fn remove(mut self) -> Result<(), StorageError> {
        self.removed = true;
        remove_dir(&self.path)
    }
}

impl Drop for WorkingDirectory {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = remove_dir(&self.path) {
            warn!("Failed to clean up working directory: {}", e);
        }
    }
}

/// Writes `content` to a freshly created file, deleting it if the write fails.
fn write_or_remove<W: Write>(mut file: W, path: &Path, content: &[u8]) -> Result<(), StorageError> {
    let written = file.write_all(content).and_then(|()| file.flush());
    drop(file);

    written.map_err(|e| {
        if let Err(remove_err) = std::fs::remove_file(path) {
            warn!("Failed to remove partial file {}: {}", path.display(), remove_err);
        }
        StorageError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

/// Builds `{base}_{counter}{ext}`, shortening `base` on a char boundary so
/// the result still fits in a filename.
fn numbered_variant(base: &str, ext: &str, counter: usize) -> String {
    let suffix = format!("_{}", counter);
    let budget = MAX_FILENAME_LEN.saturating_sub(suffix.len() + ext.len());
    let mut cut = base.len().min(budget);
    while !base.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{}{}", &base[..cut], suffix, ext)
}

fn remove_dir(path: &Path) -> Result<(), StorageError> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => {
            debug!("Removed working directory {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::Remove {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
