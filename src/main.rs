//! # media-dedup CLI
//!
//! Command-line interface for the media deduplicator.
//!
//! ## Usage
//! ```bash
//! media-dedup find-dups ~/Photos
//! media-dedup resolve --dry-run --verbose
//! ```

mod cli;

use media_dedup::Result;

fn main() -> Result<()> {
    cli::run()
}
