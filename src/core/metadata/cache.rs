//! JSON cache in front of a metadata provider.
//!
//! The first run writes the provider's records to disk; later runs read them
//! back without invoking the provider. A stale cache is detected downstream
//! as a [`MetadataError::Mismatch`](crate::error::MetadataError::Mismatch).

use super::{MetadataProvider, RawMetadata};
use crate::error::MetadataError;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Wraps a provider and persists its output as a JSON array
pub struct CachedMetadataProvider {
    inner: Box<dyn MetadataProvider>,
    cache_path: PathBuf,
}

impl CachedMetadataProvider {
    pub fn new(inner: Box<dyn MetadataProvider>, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            cache_path: cache_path.into(),
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    fn load(&self) -> Result<Vec<RawMetadata>, MetadataError> {
        let content = fs::read_to_string(&self.cache_path).map_err(|source| {
            MetadataError::CacheIo {
                path: self.cache_path.clone(),
                source,
            }
        })?;

        serde_json::from_str(&content).map_err(|source| MetadataError::Parse {
            origin: self.cache_path.display().to_string(),
            source,
        })
    }

    fn store(&self, records: &[RawMetadata]) -> Result<(), MetadataError> {
        let mut buffer = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        records
            .serialize(&mut serializer)
            .map_err(|source| MetadataError::Parse {
                origin: self.cache_path.display().to_string(),
                source,
            })?;

        if let Some(parent) = self.cache_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| MetadataError::CacheIo {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(&self.cache_path, buffer).map_err(|source| MetadataError::CacheIo {
            path: self.cache_path.clone(),
            source,
        })
    }
}

impl MetadataProvider for CachedMetadataProvider {
    fn collect(&self, root: &Path) -> Result<Vec<RawMetadata>, MetadataError> {
        if self.cache_path.exists() {
            info!("Loading cached metadata from {}", self.cache_path.display());
            return self.load();
        }

        let records = self.inner.collect(root)?;
        self.store(&records)?;
        info!(
            "Cached {} metadata records to {}",
            records.len(),
            self.cache_path.display()
        );
        Ok(records)
    }

    fn supported_extensions(&self) -> Result<Vec<String>, MetadataError> {
        self.inner.supported_extensions()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
