//! # Metadata Module
//!
//! Resolution and capture time for every file under a root, keyed by
//! normalized path.
//!
//! ## Providers
//! - [`ExifToolProvider`] - runs `exiftool` once over the whole tree
//! - [`ExifMetadataProvider`] - in-process EXIF reader, no external binary
//! - [`InMemoryMetadataProvider`] - fixed records, for tests
//!
//! Any provider can be wrapped in [`CachedMetadataProvider`] so repeated runs
//! reuse the JSON written by the first one.

mod cache;
mod exif;
mod exiftool;
mod memory;

pub use cache::CachedMetadataProvider;
pub use exif::ExifMetadataProvider;
pub use exiftool::{parse_listf, ExifToolProvider};
pub use memory::InMemoryMetadataProvider;

use crate::core::media::normalize_path;
use crate::error::MetadataError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Capture time written by cameras that never had their clock set
pub const UNKNOWN_CAPTURE_TIME: &str = "0000:00:00 00:00:00";

const EXIF_DATETIME: &str = "%Y:%m:%d %H:%M:%S";
const ISO_DATETIME: &str = "%Y-%m-%dT%H:%M:%S";
const SPACED_ISO_DATETIME: &str = "%Y-%m-%d %H:%M:%S";

/// Source of per-file metadata for a directory tree
pub trait MetadataProvider: Send + Sync {
    /// Collect raw records for every file under `root`
    fn collect(&self, root: &Path) -> Result<Vec<RawMetadata>, MetadataError>;

    /// Extensions (lower-case, no dot) this provider can describe
    fn supported_extensions(&self) -> Result<Vec<String>, MetadataError>;

    /// Short name for log lines
    fn name(&self) -> &str;
}

/// One record as emitted by the tagging tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMetadata {
    #[serde(rename = "SourceFile")]
    pub source_file: String,

    #[serde(
        rename = "ImageSize",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_string"
    )]
    pub image_size: Option<String>,

    #[serde(
        rename = "DateTimeOriginal",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_string"
    )]
    pub date_time_original: Option<String>,
}

/// Accept strings, numbers or null where a string is expected
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Pixel dimensions, `0x0` when unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Parse `"WxH"` (or `"W H"`); anything else is `0x0`
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw
            .split(|c: char| c == 'x' || c == 'X' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .map(|p| p.parse::<u32>());

        match (parts.next(), parts.next(), parts.next()) {
            (Some(Ok(width)), Some(Ok(height)), None) => Self { width, height },
            _ => Self::default(),
        }
    }

    /// Pixel count, the primary ranking key
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<String> for Resolution {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<Resolution> for String {
    fn from(resolution: Resolution) -> Self {
        resolution.to_string()
    }
}

/// Parse a capture timestamp in EXIF or ISO form.
///
/// Empty strings, the all-zero sentinel and anything unparseable are
/// `None`. Sub-second and offset suffixes are ignored.
pub fn parse_capture_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() || raw == UNKNOWN_CAPTURE_TIME {
        return None;
    }

    let head = raw.get(..19)?;
    [EXIF_DATETIME, ISO_DATETIME, SPACED_ISO_DATETIME]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(head, format).ok())
}

/// Rewrite a parseable timestamp as ISO-8601; leave everything else verbatim
pub fn normalize_capture_time(raw: &str) -> String {
    match parse_capture_time(raw) {
        Some(time) => time.format(ISO_DATETIME).to_string(),
        None => raw.to_string(),
    }
}

/// Metadata joined onto a media record
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetadataEntry {
    pub resolution: Resolution,
    /// ISO-8601 when parseable, otherwise as reported
    pub capture_time: Option<String>,
}

impl From<&RawMetadata> for MetadataEntry {
    fn from(raw: &RawMetadata) -> Self {
        Self {
            resolution: raw
                .image_size
                .as_deref()
                .map(Resolution::parse)
                .unwrap_or_default(),
            capture_time: raw
                .date_time_original
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(normalize_capture_time),
        }
    }
}

/// Normalized path → metadata
#[derive(Debug, Clone, Default)]
pub struct MetadataIndex {
    entries: HashMap<String, MetadataEntry>,
}

impl MetadataIndex {
    pub fn from_records(records: &[RawMetadata]) -> Self {
        let entries = records
            .iter()
            .map(|raw| {
                (
                    normalize_path(Path::new(&raw.source_file)),
                    MetadataEntry::from(raw),
                )
            })
            .collect();
        Self { entries }
    }

    /// Look up a normalized path
    pub fn get(&self, normalized_path: &str) -> Option<&MetadataEntry> {
        self.entries.get(normalized_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
