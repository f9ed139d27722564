//! Transparent gzip handling for input files.
//!
//! Supported extensions:
//! - `.json`, `.jsonl` (uncompressed)
//! - `.json.gz`, `.jsonl.gz` (gzip compressed)
//! - `.json.bgz`, `.jsonl.bgz` (bgzip compressed; read as multi-member gzip)

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
pub fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Open a file for buffered reading, decompressing it if needed
///
/// # Errors
///
/// Returns an I/O error if the file cannot be opened.
pub fn open_reader(path: &Path) -> std::io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
