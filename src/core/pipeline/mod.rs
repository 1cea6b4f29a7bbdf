//! # Pipeline Module
//!
//! Orchestrates the four operating modes.
//!
//! ## Modes
//! 1. **Fix extensions** - rename files whose bytes disagree with their suffix
//! 2. **Find** - collect metadata, fingerprint, write the duplicate log
//! 3. **Resolve** - pick survivors, save the log, optionally delete the rest
//! 4. **Report** - render the log as HTML
//!
//! Every path and tool binary comes from [`PipelineConfig`]; nothing is read
//! from the environment. Each mode persists its result, so the stages can be
//! re-run independently.

mod executor;

pub use executor::{
    FindOutcome, FindSummary, MetadataBackend, Pipeline, PipelineBuilder, PipelineConfig,
    ResolveSummary,
};
