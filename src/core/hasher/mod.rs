//! # Hasher Module
//!
//! Computes perceptual fingerprints for images, HEIC stills and videos.
//!
//! ## How It Works
//! 1. Decode the file to a raster (format-specific, see [`decode_image`])
//! 2. Downscale to grayscale and run a DCT
//! 3. Threshold the low frequencies against their mean (pHash)
//!
//! Videos are fingerprinted through one representative frame written by a
//! [`FrameExtractor`] into a scratch directory that is always removed.
//!
//! ## Example
//! ```rust,ignore
//! use media_dedup::core::hasher::{FfmpegFrameExtractor, HasherConfig};
//!
//! let fingerprinter = HasherConfig::new()
//!     .hash_size(8)
//!     .build(Box::new(FfmpegFrameExtractor::default()));
//!
//! if let Some(fingerprint) = fingerprinter.fingerprint(&path)? {
//!     println!("{}", fingerprint);
//! }
//! ```

mod decode;
mod frames;
mod perceptual;

pub use decode::{decode_image, HeifConverter};
pub use frames::{FfmpegFrameExtractor, FrameExtractor, InMemoryFrameExtractor};
pub use perceptual::{Fingerprint, PerceptualHasher};

use crate::core::media::MediaKind;
use crate::error::HashError;
use image::DynamicImage;
use std::path::Path;
use tempfile::TempDir;
use tracing::warn;

/// Configuration builder for the fingerprinter
#[derive(Debug, Clone)]
pub struct HasherConfig {
    /// Hash edge length; the hash has `hash_size²` bits
    hash_size: u32,
    heif_converter: HeifConverter,
}

impl HasherConfig {
    /// 8×8 pHash with the platform HEIC converter
    pub fn new() -> Self {
        Self {
            hash_size: 8,
            heif_converter: HeifConverter::default(),
        }
    }

    /// Set the hash edge length.
    ///
    /// Larger sizes split groups more finely.
    /// - 8: 64 bits, the duplicate log format
    /// - 16: 256 bits
    pub fn hash_size(mut self, size: u32) -> Self {
        self.hash_size = size;
        self
    }

    pub fn heif_converter(mut self, converter: HeifConverter) -> Self {
        self.heif_converter = converter;
        self
    }

    pub fn build(self, frames: Box<dyn FrameExtractor>) -> Fingerprinter {
        Fingerprinter {
            hasher: PerceptualHasher::new(self.hash_size),
            heif_converter: self.heif_converter,
            frames,
        }
    }
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Routes each file to its decode path and hashes the result
pub struct Fingerprinter {
    hasher: PerceptualHasher,
    heif_converter: HeifConverter,
    frames: Box<dyn FrameExtractor>,
}

impl Fingerprinter {
    /// Fingerprint one file.
    ///
    /// - unknown extension: `UnsupportedFormat`
    /// - image or HEIC that fails to decode: the error
    /// - video that fails anywhere: logged, `Ok(None)`
    pub fn fingerprint(&self, path: &Path) -> Result<Option<Fingerprint>, HashError> {
        match MediaKind::from_path(path) {
            None => Err(HashError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
            Some(MediaKind::Image) => {
                let image = decode_image(path)?;
                Ok(Some(self.fingerprint_image(&image)))
            }
            Some(MediaKind::Heif) => {
                let image = self.heif_converter.decode(path)?;
                Ok(Some(self.fingerprint_image(&image)))
            }
            Some(MediaKind::Video) => match self.fingerprint_video(path) {
                Ok(fingerprint) => Ok(Some(fingerprint)),
                Err(e) => {
                    warn!("Could not fingerprint video {}: {}", path.display(), e);
                    Ok(None)
                }
            },
        }
    }

    pub fn fingerprint_image(&self, image: &DynamicImage) -> Fingerprint {
        self.hasher.hash_image(image)
    }

    fn fingerprint_video(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let scratch = TempDir::new().map_err(|source| HashError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        let frame_path = scratch.path().join("frame.png");

        self.frames.extract_frame(path, &frame_path)?;
        let frame = decode_image(&frame_path)?;
        Ok(self.fingerprint_image(&frame))
    }
}
