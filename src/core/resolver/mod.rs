//! # Resolver Module
//!
//! Picks one survivor per duplicate group and lists everything else for
//! deletion.
//!
//! Resolution is idempotent: a group that already has a selected member is
//! not re-ranked, so running twice yields the same survivors and the same
//! deletion list.

mod executor;
pub mod policy;

pub use executor::{delete_files, DeletionReport};

use crate::core::duplicates::{DuplicateLog, MediaRecord};
use crate::events::{Event, EventSender, ProgressTicker, ResolveEvent};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// How often resolution progress is logged
const PROGRESS_EVERY: usize = 50;

/// Result of a resolution pass
#[derive(Debug, Default)]
pub struct ResolveOutcome {
    /// Losers and their companion videos, de-duplicated, in group order
    pub deletions: Vec<PathBuf>,
    /// Groups that got a survivor in this pass
    pub groups_resolved: usize,
    /// Groups that already had one
    pub groups_already_resolved: usize,
}

/// Applies the ranking policy to a duplicate log
#[derive(Debug, Default)]
pub struct Resolver;

impl Resolver {
    pub fn new() -> Self {
        Self
    }

    /// Mark a survivor in every group and collect the losers.
    ///
    /// A loser's linked video is queued with it unless that video is the
    /// loser itself, a survivor of some group, or a survivor's own companion.
    pub fn resolve(&self, log: &mut DuplicateLog, events: &EventSender) -> ResolveOutcome {
        let total = log.len();
        events.send(Event::Resolve(ResolveEvent::Started {
            total_groups: total,
        }));

        let mut outcome = ResolveOutcome::default();
        let mut losers: Vec<MediaRecord> = Vec::new();
        let mut ticker = ProgressTicker::new("Resolving", total, PROGRESS_EVERY, events, |p| {
            Event::Resolve(ResolveEvent::Progress(p))
        });

        for (fingerprint, group) in log.groups_mut() {
            ticker.tick(Path::new(fingerprint));

            if group.iter().any(MediaRecord::is_selected) {
                outcome.groups_already_resolved += 1;
            } else if !group.is_empty() {
                policy::rank(group);
                group[0].selected = Some(true);
                debug!("Keeping {} for {}", group[0].path, fingerprint);
                outcome.groups_resolved += 1;
            }

            losers.extend(group.iter().filter(|m| !m.is_selected()).cloned());
        }

        // Survivors and the companion videos they still need
        let kept: HashSet<&str> = log
            .groups()
            .flat_map(|(_, group)| group.iter())
            .filter(|m| m.is_selected())
            .flat_map(|m| std::iter::once(m.path.as_str()).chain(m.linked_video.as_deref()))
            .collect();

        let mut seen = HashSet::new();
        for loser in &losers {
            let companion = loser
                .linked_video
                .as_deref()
                .filter(|video| *video != loser.path && !kept.contains(video));

            for path in std::iter::once(loser.path.as_str()).chain(companion) {
                if seen.insert(path.to_string()) {
                    outcome.deletions.push(PathBuf::from(path));
                }
            }
        }

        info!(
            "Resolved {} groups ({} already resolved), {} files to delete",
            outcome.groups_resolved,
            outcome.groups_already_resolved,
            outcome.deletions.len()
        );
        outcome
    }

    /// Remove the files listed by [`Resolver::resolve`]
    pub fn delete(&self, deletions: &[PathBuf], events: &EventSender) -> DeletionReport {
        delete_files(deletions, events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::Resolution;
    use crate::events::null_sender;
    use std::fs;
    use tempfile::TempDir;

    fn record(path: &str, w: u32, h: u32) -> MediaRecord {
        MediaRecord::new(path, Resolution::new(w, h), ".jpg")
    }

    fn selected_paths(log: &DuplicateLog) -> Vec<String> {
        log.groups()
            .flat_map(|(_, g)| g.iter())
            .filter(|m| m.is_selected())
            .map(|m| m.path.clone())
            .collect()
    }

    #[test]
    fn selects_highest_resolution() {
        let mut log = DuplicateLog::new();
        log.insert("aa", record("/small.jpg", 50, 50));
        log.insert("aa", record("/large.jpg", 200, 200));
        log.insert("aa", record("/medium.jpg", 100, 100));

        let outcome = Resolver::new().resolve(&mut log, &null_sender());

        assert_eq!(selected_paths(&log), vec!["/large.jpg"]);
        assert_eq!(
            outcome.deletions,
            vec![PathBuf::from("/medium.jpg"), PathBuf::from("/small.jpg")]
        );
        assert_eq!(outcome.groups_resolved, 1);
    }

    #[test]
    fn second_run_is_a_no_op() {
        let mut log = DuplicateLog::new();
        log.insert("aa", record("/b.jpg", 10, 10));
        log.insert("aa", record("/a.jpg", 20, 20));
        log.insert("bb", record("/c.jpg", 10, 10));
        log.insert("bb", record("/d.jpg", 10, 10));
        let resolver = Resolver::new();

        let first = resolver.resolve(&mut log, &null_sender());
        let after_first = log.clone();
        let second = resolver.resolve(&mut log, &null_sender());

        assert_eq!(log, after_first);
        assert_eq!(first.deletions, second.deletions);
        assert_eq!(second.groups_resolved, 0);
        assert_eq!(second.groups_already_resolved, 2);
    }

    #[test]
    fn existing_selection_is_respected() {
        let mut log = DuplicateLog::new();
        let mut chosen = record("/small.jpg", 10, 10);
        chosen.selected = Some(true);
        log.insert("aa", record("/large.jpg", 500, 500));
        log.insert("aa", chosen);

        let outcome = Resolver::new().resolve(&mut log, &null_sender());

        assert_eq!(selected_paths(&log), vec!["/small.jpg"]);
        assert_eq!(outcome.deletions, vec![PathBuf::from("/large.jpg")]);
    }

    #[test]
    fn loser_companion_video_is_queued() {
        let mut log = DuplicateLog::new();
        log.insert("aa", record("/IMG_001.heic", 10, 10).with_linked_video("/IMG_001.mov"));
        log.insert("aa", record("/IMG_002.heic", 20, 20));

        let outcome = Resolver::new().resolve(&mut log, &null_sender());

        assert_eq!(
            outcome.deletions,
            vec![PathBuf::from("/IMG_001.heic"), PathBuf::from("/IMG_001.mov")]
        );
    }

    #[test]
    fn companion_that_survives_elsewhere_is_kept() {
        let mut log = DuplicateLog::new();
        log.insert("aa", record("/IMG_001.heic", 10, 10).with_linked_video("/IMG_001.mov"));
        log.insert("aa", record("/IMG_002.heic", 20, 20));
        log.insert("bb", record("/IMG_001.mov", 30, 30));
        log.insert("bb", record("/copy.mov", 10, 10));

        let outcome = Resolver::new().resolve(&mut log, &null_sender());

        assert!(!outcome.deletions.contains(&PathBuf::from("/IMG_001.mov")));
        assert!(outcome.deletions.contains(&PathBuf::from("/copy.mov")));
    }

    #[test]
    fn companion_shared_with_the_survivor_is_kept() {
        let mut log = DuplicateLog::new();
        log.insert("aa", record("/d/IMG_001.heic", 10, 10).with_linked_video("/d/IMG_001.mov"));
        log.insert("aa", record("/d/IMG_001.jpg", 20, 20).with_linked_video("/d/IMG_001.mov"));

        let outcome = Resolver::new().resolve(&mut log, &null_sender());

        assert_eq!(selected_paths(&log), vec!["/d/IMG_001.jpg"]);
        assert_eq!(outcome.deletions, vec![PathBuf::from("/d/IMG_001.heic")]);
    }

    #[test]
    fn deletion_list_has_no_repeats() {
        let mut log = DuplicateLog::new();
        log.insert("aa", record("/a.jpg", 10, 10).with_linked_video("/clip.mov"));
        log.insert("aa", record("/b.jpg", 10, 10).with_linked_video("/clip.mov"));
        log.insert("aa", record("/c.jpg", 50, 50));

        let outcome = Resolver::new().resolve(&mut log, &null_sender());

        assert_eq!(
            outcome.deletions,
            vec![
                PathBuf::from("/a.jpg"),
                PathBuf::from("/clip.mov"),
                PathBuf::from("/b.jpg")
            ]
        );
    }

    #[test]
    fn delete_removes_listed_files() {
        let dir = TempDir::new().unwrap();
        let loser = dir.path().join("loser.jpg");
        fs::write(&loser, b"x").unwrap();

        let report = Resolver::new().delete(
            &[loser.clone(), dir.path().join("missing.jpg")],
            &null_sender(),
        );

        assert!(!loser.exists());
        assert_eq!(report.deleted.len(), 1);
        assert_eq!(report.missing.len(), 1);
    }
}
