//! Directory walking implementation using walkdir.

use super::filter::{is_hidden, ExtensionFilter};
use super::{MediaFile, ScanResult};
use crate::core::media::MediaKind;
use crate::error::ScanError;
use std::path::Path;
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
    /// Extensions to include (None = every file)
    pub extensions: Option<Vec<String>>,
}

/// Scanner implementation using the walkdir crate
pub struct MediaScanner {
    config: ScanConfig,
    filter: ExtensionFilter,
}

impl MediaScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let mut filter = ExtensionFilter::any().with_hidden(config.include_hidden);

        if let Some(ref extensions) = config.extensions {
            filter = filter.with_extensions(extensions);
        }

        Self { config, filter }
    }

    /// Walk `root` and collect matching files.
    ///
    /// Entries are visited in file-name order within each directory so
    /// repeated runs see the same sequence.
    pub fn scan(&self, root: &Path) -> Result<ScanResult, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut files = Vec::new();
        let mut errors = Vec::new();

        let mut walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        let include_hidden = self.config.include_hidden;
        let entries = walker
            .into_iter()
            .filter_entry(|entry| include_hidden || entry.depth() == 0 || !is_hidden(entry.path()));

        for entry_result in entries {
            match entry_result {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }

                    let path = entry.path();
                    if !self.filter.should_include(path) {
                        continue;
                    }

                    files.push(MediaFile {
                        path: path.to_path_buf(),
                        kind: MediaKind::from_path(path),
                    });
                }
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();

                    let error = if e.io_error().map(|e| e.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path }
                    } else {
                        ScanError::ReadDirectory {
                            path,
                            source: std::io::Error::other(e.to_string()),
                        }
                    };

                    errors.push(error);
                }
            }
        }

        Ok(ScanResult { files, errors })
    }
}
