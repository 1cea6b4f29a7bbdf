//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the dedup stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Extension fixing events
    Fix(FixEvent),
    /// Fingerprinting and grouping events
    Group(GroupEvent),
    /// Survivor selection and deletion events
    Resolve(ResolveEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events while correcting mislabeled extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FixEvent {
    /// Walk started
    Started { total_files: usize },
    /// Progress update
    Progress(Progress),
    /// A file was renamed to match its signature
    Renamed { from: PathBuf, to: PathBuf },
    /// A rename failed, the walk continues
    Error { path: PathBuf, message: String },
    /// Walk completed
    Completed { renamed: usize },
}

/// Events during fingerprinting and grouping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GroupEvent {
    /// Metadata is being collected from the provider
    CollectingMetadata { root: PathBuf },
    /// Fingerprinting has started
    Started { total_files: usize },
    /// Progress update
    Progress(Progress),
    /// A file was skipped (unsupported, undecodable, failed frame extraction)
    Skipped { path: PathBuf, reason: String },
    /// Grouping completed
    Completed {
        total_groups: usize,
        total_duplicates: usize,
    },
}

/// Events during survivor selection and deletion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResolveEvent {
    /// Resolution started
    Started { total_groups: usize },
    /// Progress update over groups
    Progress(Progress),
    /// Deletion started
    DeletionStarted { total_files: usize },
    /// Progress update over files being deleted
    DeletionProgress(Progress),
    /// A file was deleted
    Deleted { path: PathBuf },
    /// A file was already gone
    Missing { path: PathBuf },
    /// A deletion failed, the run continues
    DeleteFailed { path: PathBuf, message: String },
    /// Resolution (and deletion, if any) completed
    Completed { deleted: usize, attempted: usize },
}

/// Generic position-in-total progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    /// Items processed so far
    pub completed: usize,
    /// Total items
    pub total: usize,
    /// Item currently being processed
    pub current_path: PathBuf,
}

impl Progress {
    /// Completion as a percentage (0-100)
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// A command started
    Started,
    /// Pipeline phase changed
    PhaseChanged { phase: PipelinePhase },
    /// A command completed
    Completed,
}

/// Pipeline phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    FixingExtensions,
    CollectingMetadata,
    Fingerprinting,
    Resolving,
    Deleting,
    Reporting,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::FixingExtensions => write!(f, "Fixing extensions"),
            PipelinePhase::CollectingMetadata => write!(f, "Collecting metadata"),
            PipelinePhase::Fingerprinting => write!(f, "Fingerprinting"),
            PipelinePhase::Resolving => write!(f, "Selecting survivors"),
            PipelinePhase::Deleting => write!(f, "Deleting"),
            PipelinePhase::Reporting => write!(f, "Writing report"),
        }
    }
}
