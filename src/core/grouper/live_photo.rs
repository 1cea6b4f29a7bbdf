//! Motion-photo companion lookup.

use crate::core::media::LIVE_PHOTO_VIDEO_SUFFIXES;
use std::path::{Path, PathBuf};

/// Find the video that shares `path`'s stem in the same directory.
///
/// Suffixes are probed in preference order, lower case before upper case.
/// A file is never its own companion.
pub fn find_linked_video(path: &Path) -> Option<PathBuf> {
    let stem = path.file_stem()?;
    let dir = path.parent()?;

    LIVE_PHOTO_VIDEO_SUFFIXES
        .iter()
        .flat_map(|suffix| [suffix.to_ascii_lowercase(), suffix.to_ascii_uppercase()])
        .map(|suffix| {
            let mut name = stem.to_os_string();
            name.push(".");
            name.push(suffix);
            dir.join(name)
        })
        .find(|candidate| candidate.is_file() && !same_file_name(candidate, path))
}

fn same_file_name(a: &Path, b: &Path) -> bool {
    a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
}
