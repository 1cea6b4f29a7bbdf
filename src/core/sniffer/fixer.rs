//! Renames files whose extension disagrees with their content.

use super::{detect_type, MediaType};
use crate::core::scanner::{MediaScanner, ScanConfig};
use crate::error::{ScanError, SniffError};
use crate::events::{null_sender, Event, EventSender, FixEvent, ProgressTicker};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// How often the fixer logs progress
const PROGRESS_EVERY: usize = 100;

/// One rename performed by the fixer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub from: PathBuf,
    pub to: PathBuf,
    pub detected: MediaType,
    /// Whether a `<from>.json` sidecar was moved along with the file
    pub sidecar_moved: bool,
}

/// Outcome of a fix pass
#[derive(Debug, Default)]
pub struct FixSummary {
    pub files_scanned: usize,
    pub renamed: Vec<Rename>,
    pub errors: Vec<SniffError>,
}

impl FixSummary {
    pub fn sidecars_renamed(&self) -> usize {
        self.renamed.iter().filter(|r| r.sidecar_moved).count()
    }
}

/// Walks a tree and corrects mislabeled extensions
pub struct ExtensionFixer {
    scan_config: ScanConfig,
}

impl ExtensionFixer {
    pub fn new() -> Self {
        Self {
            scan_config: ScanConfig {
                include_hidden: true,
                ..Default::default()
            },
        }
    }

    pub fn with_scan_config(mut self, config: ScanConfig) -> Self {
        self.scan_config = config;
        self
    }

    /// Fix every file under `root`
    pub fn fix_tree(&self, root: &Path) -> Result<FixSummary, ScanError> {
        self.fix_tree_with_events(root, &null_sender())
    }

    pub fn fix_tree_with_events(
        &self,
        root: &Path,
        events: &EventSender,
    ) -> Result<FixSummary, ScanError> {
        let scanner = MediaScanner::new(self.scan_config.clone());
        let scan = scanner.scan(root)?;
        for error in &scan.errors {
            warn!("{}", error);
        }

        let total = scan.files.len();
        events.send(Event::Fix(FixEvent::Started { total_files: total }));

        let mut summary = FixSummary {
            files_scanned: total,
            ..Default::default()
        };
        let mut ticker = ProgressTicker::new("Fixing extensions", total, PROGRESS_EVERY, events, |p| {
            Event::Fix(FixEvent::Progress(p))
        });

        for file in &scan.files {
            ticker.tick(&file.path);

            match fix_file(&file.path) {
                Ok(Some(rename)) => {
                    info!(
                        "Renamed {} -> {} ({} content)",
                        rename.from.display(),
                        rename.to.display(),
                        rename.detected
                    );
                    events.send(Event::Fix(FixEvent::Renamed {
                        from: rename.from.clone(),
                        to: rename.to.clone(),
                    }));
                    summary.renamed.push(rename);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("{}", e);
                    events.send(Event::Fix(FixEvent::Error {
                        path: file.path.clone(),
                        message: e.to_string(),
                    }));
                    summary.errors.push(e);
                }
            }
        }

        events.send(Event::Fix(FixEvent::Completed {
            renamed: summary.renamed.len(),
        }));

        Ok(summary)
    }
}

impl Default for ExtensionFixer {
    fn default() -> Self {
        Self::new()
    }
}

/// Rename a single file if its signature disagrees with its extension.
///
/// Returns `Ok(None)` when the type is unknown or already correct.
pub fn fix_file(path: &Path) -> Result<Option<Rename>, SniffError> {
    let Some(detected) = detect_type(path) else {
        return Ok(None);
    };

    let current_ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if detected.matches_extension(current_ext) {
        return Ok(None);
    }

    let target = corrected_path(path, detected);
    if target.exists() {
        return Err(SniffError::TargetExists { path: target });
    }

    // Both targets are checked before anything moves
    let sidecar = sidecar_path(path);
    let new_sidecar = sidecar_path(&target);
    let sidecar_moved = sidecar.exists();
    if sidecar_moved && new_sidecar.exists() {
        return Err(SniffError::TargetExists { path: new_sidecar });
    }

    debug!("{} is {} but named .{}", path.display(), detected, current_ext);
    fs::rename(path, &target).map_err(|source| SniffError::Rename {
        from: path.to_path_buf(),
        to: target.clone(),
        source,
    })?;

    if sidecar_moved {
        if let Err(source) = fs::rename(&sidecar, &new_sidecar) {
            // Put the media file back so it still matches its sidecar
            if let Err(e) = fs::rename(&target, path) {
                warn!("Could not restore {}: {}", path.display(), e);
            }
            return Err(SniffError::Rename {
                from: sidecar,
                to: new_sidecar,
                source,
            });
        }
    }

    Ok(Some(Rename {
        from: path.to_path_buf(),
        to: target,
        detected,
        sidecar_moved,
    }))
}

/// Replace only the trailing extension token; a file without one gets the
/// canonical extension appended
fn corrected_path(path: &Path, detected: MediaType) -> PathBuf {
    if path.extension().is_some() {
        path.with_extension(detected.canonical_extension())
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".");
        name.push(detected.canonical_extension());
        PathBuf::from(name)
    }
}

/// `<file>.json`, the sidecar naming convention of photo exports
fn sidecar_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".json");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F', 0, 1];

    fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        File::create(&path).unwrap().write_all(bytes).unwrap();
        path
    }

    #[test]
    fn png_named_jpg_is_renamed_with_sidecar() {
        let dir = TempDir::new().unwrap();
        let image = write_file(dir.path(), "IMG.jpg", PNG_MAGIC);
        write_file(dir.path(), "IMG.jpg.json", b"{}");

        let rename = fix_file(&image).unwrap().unwrap();

        assert_eq!(rename.to, dir.path().join("IMG.png"));
        assert!(rename.sidecar_moved);
        assert!(dir.path().join("IMG.png").exists());
        assert!(dir.path().join("IMG.png.json").exists());
        assert!(!dir.path().join("IMG.jpg").exists());
        assert!(!dir.path().join("IMG.jpg.json").exists());
    }

    #[test]
    fn uppercase_extension_is_replaced() {
        let dir = TempDir::new().unwrap();
        let image = write_file(dir.path(), "IMG.JPG", PNG_MAGIC);

        let rename = fix_file(&image).unwrap().unwrap();

        assert_eq!(rename.to, dir.path().join("IMG.png"));
    }

    #[test]
    fn correct_extension_is_left_alone() {
        let dir = TempDir::new().unwrap();
        let png = write_file(dir.path(), "a.PNG", PNG_MAGIC);
        let jpeg = write_file(dir.path(), "b.jpeg", JPEG_MAGIC);

        assert!(fix_file(&png).unwrap().is_none());
        assert!(fix_file(&jpeg).unwrap().is_none());
        assert!(png.exists());
        assert!(jpeg.exists());
    }

    #[test]
    fn unknown_content_is_left_alone() {
        let dir = TempDir::new().unwrap();
        let text = write_file(dir.path(), "notes.jpg", b"hello world, not an image");
        assert!(fix_file(&text).unwrap().is_none());
    }

    #[test]
    fn file_without_extension_gets_one() {
        let dir = TempDir::new().unwrap();
        let file = write_file(dir.path(), "IMG_0001", JPEG_MAGIC);

        let rename = fix_file(&file).unwrap().unwrap();

        assert_eq!(rename.to, dir.path().join("IMG_0001.jpg"));
    }

    #[test]
    fn existing_target_is_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let image = write_file(dir.path(), "IMG.jpg", PNG_MAGIC);
        write_file(dir.path(), "IMG.png", b"keep me");

        let result = fix_file(&image);

        assert!(matches!(result, Err(SniffError::TargetExists { .. })));
        assert!(image.exists());
        assert_eq!(fs::read(dir.path().join("IMG.png")).unwrap(), b"keep me");
    }

    #[test]
    fn existing_sidecar_target_blocks_the_whole_rename() {
        let dir = TempDir::new().unwrap();
        let image = write_file(dir.path(), "IMG.jpg", PNG_MAGIC);
        let sidecar = write_file(dir.path(), "IMG.jpg.json", b"{}");
        write_file(dir.path(), "IMG.png.json", b"other");

        let result = fix_file(&image);

        assert!(matches!(result, Err(SniffError::TargetExists { .. })));
        assert!(image.exists());
        assert!(sidecar.exists());
        assert!(!dir.path().join("IMG.png").exists());
        assert_eq!(fs::read(dir.path().join("IMG.png.json")).unwrap(), b"other");
    }

    #[test]
    fn correctly_named_iso_bmff_files_are_left_alone() {
        let dir = TempDir::new().unwrap();
        let clip = write_file(dir.path(), "clip.3gp", b"\0\0\0\x18ftyp3gp4\0\0\0\0");
        let still = write_file(dir.path(), "pic.avif", b"\0\0\0\x1cftypavif\0\0\0\0");
        let audio = write_file(dir.path(), "song.m4a", b"\0\0\0\x20ftypM4A \0\0\0\0");

        for file in [&clip, &still, &audio] {
            assert!(fix_file(file).unwrap().is_none());
            assert!(file.exists());
        }
    }

    #[test]
    fn fix_tree_walks_nested_directories() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("2020").join("trip");
        fs::create_dir_all(&nested).unwrap();
        write_file(&nested, "a.jpg", PNG_MAGIC);
        write_file(dir.path(), "b.png", PNG_MAGIC);

        let summary = ExtensionFixer::new().fix_tree(dir.path()).unwrap();

        assert_eq!(summary.files_scanned, 2);
        assert_eq!(summary.renamed.len(), 1);
        assert!(nested.join("a.png").exists());
        assert!(summary.errors.is_empty());
    }
}
