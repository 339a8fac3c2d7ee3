//! Helpers for cleaning untrusted names before they touch the filesystem or logs.

use std::path::Path;

/// Maximum filename length accepted by common filesystems.
pub(crate) const MAX_FILENAME_LEN: usize = 255;

/// Returns only the filename component of a path (no directory).
///
/// Safe for span fields: reveals the file name without exposing the full path.
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Sanitizes an attachment filename so it stays inside the working directory.
///
/// Path separators, NUL and control characters become `_`; everything else
/// is kept as sent. Leading/trailing dots and spaces are trimmed.
pub fn sanitize_filename(filename: &str) -> String {
    let filename = filename
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c == '\0' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect::<String>();

    let filename = filename.trim_matches(|c| c == '.' || c == ' ');

    if filename.is_empty() {
        return "attachment".to_string();
    }

    if filename.len() <= MAX_FILENAME_LEN {
        return filename.to_string();
    }

    // Keep the extension and cut the stem on a char boundary
    let ext = filename
        .rfind('.')
        .map(|i| &filename[i..])
        .filter(|ext| ext.len() <= 50)
        .unwrap_or("");
    let budget = MAX_FILENAME_LEN - ext.len();
    let stem_end = filename.len() - ext.len();
    let mut cut = budget.min(stem_end);
    while !filename.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{}", &filename[..cut], ext)
}
