//! # Error Module
//!
//! Error types for the media deduplicator.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, tool names, what went wrong
//! - **Per-file vs. per-run** - hashing and rename errors are isolated to one
//!   file; metadata and log errors abort the command

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum DedupError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Fingerprint error: {0}")]
    Hash(#[from] HashError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Duplicate log error: {0}")]
    Log(#[from] LogError),

    #[error("Extension fix error: {0}")]
    Sniff(#[from] SniffError),

    #[error("Report generation error: {0}")]
    Report(#[from] ReportError),
}

/// Errors that occur during directory traversal
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while fingerprinting a single file
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Unsupported media format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to decode {path}: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("{tool} failed on {path}: {reason}")]
    ExternalTool {
        tool: String,
        path: PathBuf,
        reason: String,
    },

    #[error("Failed to open media file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the metadata provider; all of them abort the run
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to run {tool}: {reason}")]
    ToolFailed { tool: String, reason: String },

    #[error("{tool} returned no output")]
    EmptyOutput { tool: String },

    #[error("Failed to parse metadata from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to access metadata cache {path}: {source}")]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No metadata record for {path}. Delete the metadata cache and run again.")]
    Mismatch { path: String },
}

/// Errors reading or writing the duplicate log
#[derive(Error, Debug)]
pub enum LogError {
    #[error("Duplicate log not found at {path}. Run find-dups first.")]
    NotFound { path: PathBuf },

    #[error("Failed to access duplicate log {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Duplicate log {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors while correcting file extensions
#[derive(Error, Debug)]
pub enum SniffError {
    #[error("Failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Refusing to overwrite existing file {path}")]
    TargetExists { path: PathBuf },
}

/// Errors that occur during report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DedupError>;
