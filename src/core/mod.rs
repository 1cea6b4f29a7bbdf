//! # Core Module
//!
//! The deduplication engine, independent of how progress is shown.
//!
//! ## Modules
//! - `media` - Which extensions are images, HEIF stills and videos
//! - `sniffer` - Detects real file types and fixes extensions
//! - `metadata` - Resolution and capture time per file
//! - `hasher` - Computes perceptual fingerprints
//! - `scanner` - Walks directory trees
//! - `grouper` - Groups files by fingerprint
//! - `duplicates` - The persisted duplicate log
//! - `resolver` - Picks survivors and deletes the rest
//! - `reporter` - HTML report of the log
//! - `pipeline` - Orchestrates the full workflow

pub mod duplicates;
pub mod grouper;
pub mod hasher;
pub mod media;
pub mod metadata;
pub mod pipeline;
pub mod reporter;
pub mod resolver;
pub mod scanner;
pub mod sniffer;

// Re-export commonly used types
pub use duplicates::{DuplicateLog, MediaRecord};
pub use hasher::{Fingerprint, Fingerprinter};
pub use media::MediaKind;
pub use metadata::{MetadataProvider, Resolution};
pub use scanner::MediaFile;
