//! # Media Dedup
//!
//! Finds perceptual duplicates among photos and videos, keeps the best copy
//! of each and removes the rest.
//!
//! ## Core Philosophy
//! - **Same picture, not same bytes** - a resized JPEG and its PNG original
//!   are duplicates
//! - **Deterministic survivors** - resolution, then capture time, then PNG
//! - **Restartable** - every stage persists JSON the next one reads
//!
//! ## Architecture
//! - `core` - The deduplication engine
//! - `events` - Event-driven progress reporting
//! - `error` - Error types with path context
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{DedupError, Result};

/// Initialize tracing for the library
///
/// Called once by the application entry point. `RUST_LOG` wins when set;
/// otherwise the level is `info`, or `debug` when `verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    // A second call (tests, embedding) keeps the first subscriber
    let _ = tracing::subscriber::set_global_default(subscriber);
}
