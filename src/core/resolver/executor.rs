//! Best-effort removal of the files the resolver gave up on.

use crate::events::{Event, EventSender, ProgressTicker, ResolveEvent};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// How often deletion progress is logged
const PROGRESS_EVERY: usize = 50;

/// What happened to each listed file
#[derive(Debug, Default)]
pub struct DeletionReport {
    pub deleted: Vec<PathBuf>,
    /// Already gone before we got to them
    pub missing: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl DeletionReport {
    pub fn attempted(&self) -> usize {
        self.deleted.len() + self.missing.len() + self.failed.len()
    }
}

/// Remove every path, carrying on past missing files and OS errors
pub fn delete_files(paths: &[PathBuf], events: &EventSender) -> DeletionReport {
    events.send(Event::Resolve(ResolveEvent::DeletionStarted {
        total_files: paths.len(),
    }));

    let mut report = DeletionReport::default();
    let mut ticker = ProgressTicker::new("Deleting", paths.len(), PROGRESS_EVERY, events, |p| {
        Event::Resolve(ResolveEvent::DeletionProgress(p))
    });

    for path in paths {
        ticker.tick(path);

        match fs::remove_file(path) {
            Ok(()) => {
                info!("Deleted {}", path.display());
                events.send(Event::Resolve(ResolveEvent::Deleted { path: path.clone() }));
                report.deleted.push(path.clone());
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("File not found, skipping: {}", path.display());
                events.send(Event::Resolve(ResolveEvent::Missing { path: path.clone() }));
                report.missing.push(path.clone());
            }
            Err(e) => {
                error!("Failed to delete {}: {}", path.display(), e);
                events.send(Event::Resolve(ResolveEvent::DeleteFailed {
                    path: path.clone(),
                    message: e.to_string(),
                }));
                report.failed.push((path.clone(), e.to_string()));
            }
        }
    }

    info!(
        "Deleted {} of {} files",
        report.deleted.len(),
        report.attempted()
    );
    events.send(Event::Resolve(ResolveEvent::Completed {
        deleted: report.deleted.len(),
        attempted: report.attempted(),
    }));

    report
}
