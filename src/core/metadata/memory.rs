//! Fixed-record provider for tests and embedding.

use super::{MetadataProvider, RawMetadata};
use crate::core::media::known_extensions;
use crate::error::MetadataError;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Returns the records it was built with
#[derive(Debug, Default)]
pub struct InMemoryMetadataProvider {
    records: Vec<RawMetadata>,
    calls: AtomicUsize,
}

impl InMemoryMetadataProvider {
    pub fn new(records: Vec<RawMetadata>) -> Self {
        Self {
            records,
            calls: AtomicUsize::new(0),
        }
    }

    /// Add a record for `path` with the given size and capture time
    pub fn with_record(
        mut self,
        path: &Path,
        image_size: Option<&str>,
        date_time_original: Option<&str>,
    ) -> Self {
        self.records.push(RawMetadata {
            source_file: crate::core::media::normalize_path(path),
            image_size: image_size.map(String::from),
            date_time_original: date_time_original.map(String::from),
        });
        self
    }

    /// How many times `collect` ran
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl MetadataProvider for InMemoryMetadataProvider {
    fn collect(&self, _root: &Path) -> Result<Vec<RawMetadata>, MetadataError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.records.clone())
    }

    fn supported_extensions(&self) -> Result<Vec<String>, MetadataError> {
        Ok(known_extensions().map(String::from).collect())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
