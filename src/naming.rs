//! File Naming
//!
//! Stored files never keep the name the client sent. Each upload gets a
//! generated name of the form:
//!
//! ```text
//! simplehost-1700000000.pdf
//! └───┬────┘ └───┬────┘└┬─┘
//!   prefix   unix secs  original extension (may be empty)
//! ```
//!
//! When two uploads land in the same second with the same extension, the
//! later one gets a sequence suffix before the extension
//! (`simplehost-1700000000-1.pdf`).
//!
//! Download requests carry a name chosen by the client, so [`validate`] runs
//! before any path is built from it.

/// Returns the extension of `original`, including the leading dot.
///
/// The extension is the suffix starting at the final `.` of the final path
/// element. Both `/` and `\` count as separators since browsers on some
/// platforms send full client paths.
///
/// # Example
///
/// ```
/// use simplehost::naming::extension;
///
/// assert_eq!(extension("report.pdf"), ".pdf");
/// assert_eq!(extension("archive.tar.gz"), ".gz");
/// assert_eq!(extension("README"), "");
/// assert_eq!(extension("dir.d/README"), "");
/// ```
pub fn extension(original: &str) -> &str {
    for (i, c) in original.char_indices().rev() {
        match c {
            '.' => return &original[i..],
            '/' | '\\' => break,
            _ => {}
        }
    }
    ""
}

/// Builds a stored file name.
///
/// `seq == 0` produces the canonical form; anything else inserts `-{seq}`
/// before the extension.
pub fn generate(prefix: &str, unix_secs: u64, ext: &str, seq: u32) -> String {
    if seq == 0 {
        format!("{}-{}{}", prefix, unix_secs, ext)
    } else {
        format!("{}-{}-{}{}", prefix, unix_secs, seq, ext)
    }
}

/// Builds the relative download link for a stored name.
pub fn download_link(file_name: &str) -> String {
    format!("/download?file={}", urlencoding::encode(file_name))
}

/// Why a requested file name was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("file name is empty")]
    Empty,

    #[error("file name contains a path separator")]
    Separator,

    #[error("file name refers to a parent or current directory")]
    DotSegment,

    #[error("file name contains a NUL byte")]
    Nul,
}

/// Checks that a client-supplied name can only ever resolve to a direct
/// child of the storage root.
pub fn validate(name: &str) -> Result<&str, NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if name.contains(['/', '\\']) {
        return Err(NameError::Separator);
    }
    if name.contains('\0') {
        return Err(NameError::Nul);
    }
    if name == "." || name.contains("..") {
        return Err(NameError::DotSegment);
    }
    Ok(name)
}
