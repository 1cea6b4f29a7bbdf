//! # Duplicates Module
//!
//! The duplicate log: fingerprint → the files that share it.
//!
//! The log is the hand-off between stages. The grouper writes it once, the
//! resolver marks survivors in place, the reporter only reads it. Keys are
//! kept sorted so the JSON on disk is deterministic.

use crate::core::metadata::Resolution;
use crate::error::LogError;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// One physical file in a duplicate group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRecord {
    /// Path with `/` separators
    #[serde(rename = "SourceFile")]
    pub path: String,

    #[serde(rename = "ImageSize", default)]
    pub resolution: Resolution,

    /// Lower-case, with the dot (`.png`); empty when the file has none
    #[serde(rename = "FileExtension", default)]
    pub extension: String,

    #[serde(
        rename = "DateTimeOriginal",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub capture_time: Option<String>,

    /// Motion-photo companion video
    #[serde(
        rename = "linkedVideoPath",
        alias = "live_photo_video",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub linked_video: Option<String>,

    /// Set by the resolver on the survivor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
}

impl MediaRecord {
    pub fn new(path: impl Into<String>, resolution: Resolution, extension: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            resolution,
            extension: extension.into(),
            capture_time: None,
            linked_video: None,
            selected: None,
        }
    }

    pub fn with_capture_time(mut self, capture_time: impl Into<String>) -> Self {
        self.capture_time = Some(capture_time.into());
        self
    }

    pub fn with_linked_video(mut self, video: impl Into<String>) -> Self {
        self.linked_video = Some(video.into());
        self
    }

    pub fn is_selected(&self) -> bool {
        self.selected == Some(true)
    }
}

/// Members of one fingerprint, in discovery order
pub type DuplicateGroup = Vec<MediaRecord>;

/// Fingerprint hex → group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DuplicateLog {
    groups: BTreeMap<String, DuplicateGroup>,
}

impl DuplicateLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `record` to the group for `fingerprint`
    pub fn insert(&mut self, fingerprint: impl Into<String>, record: MediaRecord) {
        self.groups.entry(fingerprint.into()).or_default().push(record);
    }

    /// Drop every group with fewer than two members
    pub fn retain_duplicates(&mut self) {
        self.groups.retain(|_, members| members.len() >= 2);
    }

    pub fn get(&self, fingerprint: &str) -> Option<&DuplicateGroup> {
        self.groups.get(fingerprint)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&String, &DuplicateGroup)> {
        self.groups.iter()
    }

    pub fn groups_mut(&mut self) -> impl Iterator<Item = (&String, &mut DuplicateGroup)> {
        self.groups.iter_mut()
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Files across every group
    pub fn total_files(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Files that would go if every group kept one
    pub fn total_duplicates(&self) -> usize {
        self.groups.values().map(|g| g.len().saturating_sub(1)).sum()
    }

    /// Read a log written by [`DuplicateLog::save`]
    pub fn load(path: &Path) -> Result<Self, LogError> {
        if !path.exists() {
            return Err(LogError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|source| LogError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| LogError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the log as 4-space indented JSON.
    ///
    /// The content goes to a temp file in the same directory first and is
    /// renamed over `path`, so readers never see a partial log.
    pub fn save(&self, path: &Path) -> Result<(), LogError> {
        let io_error = |source| LogError::Io {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(io_error)?;

        let mut buffer = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)
            .map_err(|source| LogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        buffer.push(b'\n');

        let mut temp = NamedTempFile::new_in(dir).map_err(io_error)?;
        temp.write_all(&buffer).map_err(io_error)?;
        temp.as_file().sync_all().map_err(io_error)?;
        temp.persist(path).map_err(|e| io_error(e.error))?;
        Ok(())
    }
}
