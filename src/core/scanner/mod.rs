//! # Scanner Module
//!
//! Enumerates files under a root directory.
//!
//! The grouper restricts the walk to the extensions the metadata provider
//! understands; the extension fixer walks every file.
//!
//! ## Example
//! ```rust,ignore
//! use media_dedup::core::scanner::{MediaScanner, ScanConfig};
//!
//! let scanner = MediaScanner::new(ScanConfig::default());
//! let result = scanner.scan(Path::new("/Users/me/Pictures"))?;
//! ```

mod filter;
mod walker;

pub use filter::ExtensionFilter;
pub use walker::{MediaScanner, ScanConfig};

use crate::core::media::MediaKind;
use crate::error::ScanError;
use std::path::PathBuf;

/// A file discovered by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// Path as produced by the walk (root-relative if the root was)
    pub path: PathBuf,
    /// Classification from the media table, `None` for non-media
    pub kind: Option<MediaKind>,
}

/// Result of a scan
#[derive(Debug)]
pub struct ScanResult {
    /// Files in traversal order
    pub files: Vec<MediaFile>,
    /// Errors that occurred during scanning (non-fatal)
    pub errors: Vec<ScanError>,
}
