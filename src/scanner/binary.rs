//! Binary file detection.
//!
//! Two checks keep non-text files out of the index:
//!
//! 1. A fixed extension denylist (images, media, office documents, archives,
//!    fonts, compiled objects) that rejects files without opening them.
//! 2. A content sniff over the first [`SAMPLE_SIZE`] bytes: any NUL byte, or
//!    more than 30% bytes outside printable ASCII, marks the file as binary.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Number of leading bytes inspected by [`sniff_binary`].
pub const SAMPLE_SIZE: usize = 4096;

/// Fraction of non-printable bytes above which a sample counts as binary.
pub const NON_PRINTABLE_THRESHOLD: f64 = 0.30;

/// Lowercase extensions (without the dot) that are never scanned.
pub const BINARY_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "bmp", "svg", "ico", "webp", "avif",
    // audio / video
    "mp3", "mp4", "mov", "avi", "mkv", "wav", "flac",
    // documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
    // archives
    "zip", "gz", "tar", "tgz", "bz2", "7z", "rar",
    // fonts
    "woff", "woff2", "ttf", "eot", "otf",
    // compiled objects and libraries
    "jar", "class", "wasm", "so", "dylib", "o", "a", "lib", "dll",
];

/// Check whether the path's extension is on the binary denylist.
///
/// The comparison is case-insensitive, so `logo.PNG` is rejected too.
#[must_use]
pub fn has_binary_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .is_some_and(|ext| BINARY_EXTENSIONS.contains(&ext.as_str()))
}

#[inline]
fn is_printable(byte: u8) -> bool {
    matches!(byte, 32..=126 | b'\t' | b'\n' | b'\r')
}

/// Classify an in-memory sample.
///
/// An empty sample is text. A sample containing NUL is binary. Otherwise the
/// sample is binary when the share of non-printable bytes exceeds
/// [`NON_PRINTABLE_THRESHOLD`].
#[must_use]
pub fn is_binary_sample(sample: &[u8]) -> bool {
    if sample.contains(&0) {
        return true;
    }
    if sample.is_empty() {
        return false;
    }
    let non_printable = sample.iter().filter(|&&b| !is_printable(b)).count();
    (non_printable as f64 / sample.len() as f64) > NON_PRINTABLE_THRESHOLD
}

/// Read up to [`SAMPLE_SIZE`] bytes from the file and classify them.
///
/// # Errors
///
/// Returns the underlying I/O error if the file cannot be opened or read.
/// Callers treat that as "skip this file".
pub fn sniff_binary(path: &Path) -> io::Result<bool> {
    let file = File::open(path)?;
    let mut sample = Vec::with_capacity(SAMPLE_SIZE);
    file.take(SAMPLE_SIZE as u64).read_to_end(&mut sample)?;
    Ok(is_binary_sample(&sample))
}
