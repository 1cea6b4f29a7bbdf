//! In-process metadata provider.
//!
//! Reads dimensions from the image header (falling back to EXIF pixel
//! dimension tags) and the capture time from EXIF `DateTimeOriginal`.
//! Videos get whatever EXIF their container carries, usually nothing.

use super::{MetadataProvider, RawMetadata};
use crate::core::media::{known_extensions, normalize_path};
use crate::core::scanner::{MediaScanner, ScanConfig};
use crate::error::MetadataError;
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::warn;

/// EXIF-based provider for machines without exiftool
#[derive(Debug, Clone, Default)]
pub struct ExifMetadataProvider {
    include_hidden: bool,
}

impl ExifMetadataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match the grouper's hidden-file policy so both walks see the same files
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }
}

impl MetadataProvider for ExifMetadataProvider {
    fn collect(&self, root: &Path) -> Result<Vec<RawMetadata>, MetadataError> {
        let scanner = MediaScanner::new(ScanConfig {
            include_hidden: self.include_hidden,
            extensions: Some(known_extensions().map(String::from).collect()),
            ..Default::default()
        });

        let scan = scanner.scan(root).map_err(|e| MetadataError::ToolFailed {
            tool: self.name().to_string(),
            reason: e.to_string(),
        })?;
        for error in &scan.errors {
            warn!("{}", error);
        }

        Ok(scan.files.iter().map(|f| extract_metadata(&f.path)).collect())
    }

    fn supported_extensions(&self) -> Result<Vec<String>, MetadataError> {
        Ok(known_extensions().map(String::from).collect())
    }

    fn name(&self) -> &str {
        "exif"
    }
}

/// Read what we can about one file; missing pieces stay `None`
pub fn extract_metadata(path: &Path) -> RawMetadata {
    let mut record = RawMetadata {
        source_file: normalize_path(path),
        image_size: image::image_dimensions(path)
            .ok()
            .map(|(w, h)| format!("{}x{}", w, h)),
        date_time_original: None,
    };

    let Ok(file) = File::open(path) else {
        return record;
    };
    let mut bufreader = BufReader::new(file);
    let Ok(exif) = Reader::new().read_from_container(&mut bufreader) else {
        return record;
    };

    if let Some(field) = exif.get_field(Tag::DateTimeOriginal, In::PRIMARY) {
        record.date_time_original = get_string_value(&field.value);
    }

    if record.image_size.is_none() {
        let width = exif
            .get_field(Tag::PixelXDimension, In::PRIMARY)
            .and_then(|f| get_u32_value(&f.value));
        let height = exif
            .get_field(Tag::PixelYDimension, In::PRIMARY)
            .and_then(|f| get_u32_value(&f.value));
        if let (Some(w), Some(h)) = (width, height) {
            record.image_size = Some(format!("{}x{}", w, h));
        }
    }

    record
}

fn get_u32_value(value: &Value) -> Option<u32> {
    match value {
        Value::Long(vec) => vec.first().copied(),
        Value::Short(vec) => vec.first().map(|v| *v as u32),
        _ => None,
    }
}

fn get_string_value(value: &Value) -> Option<String> {
    let Value::Ascii(vec) = value else {
        return None;
    };
    let text = std::str::from_utf8(vec.first()?).ok()?;
    let trimmed = text.trim_end_matches('\0').trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
