//! # Grouper Module
//!
//! Fingerprints every supported file under a root and collects the files
//! that share a fingerprint into a [`DuplicateLog`].
//!
//! Matching is exact on the fingerprint hex: two files are duplicates when
//! their perceptual hashes are identical, not merely close.

mod live_photo;

pub use live_photo::find_linked_video;

use crate::core::duplicates::{DuplicateLog, MediaRecord};
use crate::core::hasher::Fingerprinter;
use crate::core::media::{extension_of, normalize_path};
use crate::core::metadata::{MetadataIndex, MetadataProvider};
use crate::core::scanner::{MediaScanner, ScanConfig};
use crate::error::{DedupError, HashError, MetadataError};
use crate::events::{Event, EventSender, GroupEvent, ProgressTicker};
use std::path::Path;
use tracing::{info, warn};

/// How often the grouper logs progress
const PROGRESS_EVERY: usize = 50;

/// Grouper settings
#[derive(Debug, Clone, Default)]
pub struct GrouperConfig {
    /// Walk into hidden files and directories
    pub include_hidden: bool,
    pub follow_symlinks: bool,
    /// Fail the run on the first image that cannot be decoded
    pub abort_on_decode_error: bool,
}

/// Result of one grouping pass
#[derive(Debug)]
pub struct GroupingOutcome {
    pub log: DuplicateLog,
    /// Files the walk found with a supported extension
    pub files_total: usize,
    pub files_hashed: usize,
    pub files_skipped: usize,
}

/// Builds the duplicate log for a directory tree
pub struct DuplicateGrouper<'a> {
    metadata: &'a dyn MetadataProvider,
    fingerprinter: &'a Fingerprinter,
    config: GrouperConfig,
}

impl<'a> DuplicateGrouper<'a> {
    pub fn new(
        metadata: &'a dyn MetadataProvider,
        fingerprinter: &'a Fingerprinter,
        config: GrouperConfig,
    ) -> Self {
        Self {
            metadata,
            fingerprinter,
            config,
        }
    }

    /// Fingerprint every file under `root` and keep the groups of two or more.
    ///
    /// A hashed file with no metadata record aborts the run with
    /// [`MetadataError::Mismatch`]; that means the metadata cache is stale.
    pub fn group_duplicates(
        &self,
        root: &Path,
        events: &EventSender,
    ) -> Result<GroupingOutcome, DedupError> {
        events.send(Event::Group(GroupEvent::CollectingMetadata {
            root: root.to_path_buf(),
        }));
        let records = self.metadata.collect(root)?;
        let index = MetadataIndex::from_records(&records);
        info!(
            "{} metadata records from {}",
            index.len(),
            self.metadata.name()
        );

        let scanner = MediaScanner::new(ScanConfig {
            follow_symlinks: self.config.follow_symlinks,
            include_hidden: self.config.include_hidden,
            max_depth: None,
            extensions: Some(self.metadata.supported_extensions()?),
        });
        let scan = scanner.scan(root)?;
        for error in &scan.errors {
            warn!("{}", error);
        }

        let total = scan.files.len();
        info!("Processing {} files...", total);
        events.send(Event::Group(GroupEvent::Started { total_files: total }));

        let mut log = DuplicateLog::new();
        let mut files_hashed = 0;
        let mut files_skipped = 0;
        let mut ticker = ProgressTicker::new("Processing", total, PROGRESS_EVERY, events, |p| {
            Event::Group(GroupEvent::Progress(p))
        });

        for file in &scan.files {
            ticker.tick(&file.path);

            let fingerprint = match self.fingerprinter.fingerprint(&file.path) {
                Ok(Some(fingerprint)) => fingerprint,
                Ok(None) => {
                    files_skipped += 1;
                    skip(events, &file.path, "no usable frame".to_string());
                    continue;
                }
                Err(e @ HashError::UnsupportedFormat { .. }) => {
                    files_skipped += 1;
                    skip(events, &file.path, e.to_string());
                    continue;
                }
                Err(e) if self.config.abort_on_decode_error => return Err(e.into()),
                Err(e) => {
                    files_skipped += 1;
                    skip(events, &file.path, e.to_string());
                    continue;
                }
            };

            let key = normalize_path(&file.path);
            let entry = index
                .get(&key)
                .ok_or_else(|| MetadataError::Mismatch { path: key.clone() })?;

            let record = MediaRecord {
                path: key,
                resolution: entry.resolution,
                extension: extension_of(&file.path),
                capture_time: entry.capture_time.clone(),
                linked_video: find_linked_video(&file.path).map(|v| normalize_path(&v)),
                selected: None,
            };
            log.insert(fingerprint.to_hex(), record);
            files_hashed += 1;
        }

        log.retain_duplicates();
        info!(
            "Found {} duplicate groups covering {} files",
            log.len(),
            log.total_files()
        );
        events.send(Event::Group(GroupEvent::Completed {
            total_groups: log.len(),
            total_duplicates: log.total_duplicates(),
        }));

        Ok(GroupingOutcome {
            log,
            files_total: total,
            files_hashed,
            files_skipped,
        })
    }
}

fn skip(events: &EventSender, path: &Path, reason: String) {
    warn!("Skipping {}: {}", path.display(), reason);
    events.send(Event::Group(GroupEvent::Skipped {
        path: path.to_path_buf(),
        reason,
    }));
}
