//! Content-type detection for downloads, by magic bytes.

/// How many leading bytes are inspected.
pub const SNIFF_LEN: usize = 512;

/// Sent when nothing better is known.
pub const FALLBACK: &str = "application/octet-stream";

/// Guesses the MIME type of a file from its first bytes.
pub fn content_type(head: &[u8]) -> &'static str {
    infer::get(&head[..head.len().min(SNIFF_LEN)])
        .map(|kind| kind.mime_type())
        .unwrap_or(FALLBACK)
}
