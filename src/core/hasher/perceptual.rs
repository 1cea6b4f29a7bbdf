//! Perceptual Hash (pHash) implementation.
//!
//! pHash runs a Discrete Cosine Transform over a downscaled grayscale copy of
//! the image and thresholds the low-frequency coefficients against their
//! mean. That keeps it stable across:
//! - Scaling
//! - Re-encoding and compression artifacts
//! - Small brightness/contrast changes
//!
//! The transform itself comes from the image_hasher crate.

use image::DynamicImage;
use image_hasher::{HashAlg, HasherConfig as ImageHasherConfig};
use serde::{Deserialize, Serialize};

/// Raw perceptual hash bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    bytes: Vec<u8>,
}

impl Fingerprint {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Fixed-width lower-case hex, the duplicate log key
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Hamming distance in bits.
    ///
    /// Grouping only uses exact matches; this is for diagnostics.
    pub fn distance(&self, other: &Self) -> u32 {
        let common: u32 = self
            .bytes
            .iter()
            .zip(&other.bytes)
            .map(|(a, b)| (a ^ b).count_ones())
            .sum();
        let extra = self.bytes.len().abs_diff(other.bytes.len()) as u32 * 8;
        common + extra
    }

    pub fn bit_count(&self) -> u32 {
        (self.bytes.len() * 8) as u32
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// DCT + mean-threshold hasher
pub struct PerceptualHasher {
    hasher: image_hasher::Hasher,
}

impl PerceptualHasher {
    /// `hash_size` × `hash_size` bits
    pub fn new(hash_size: u32) -> Self {
        let hasher = ImageHasherConfig::new()
            .hash_size(hash_size, hash_size)
            .hash_alg(HashAlg::Mean)
            .preproc_dct()
            .to_hasher();

        Self { hasher }
    }

    pub fn hash_image(&self, image: &DynamicImage) -> Fingerprint {
        let hash = self.hasher.hash_image(image);
        Fingerprint::from_bytes(hash.as_bytes())
    }
}
