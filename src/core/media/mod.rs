//! # Media Module
//!
//! The single table that says which extensions are images, HEIF stills or
//! videos. Every other module asks [`MediaKind`] instead of carrying its own
//! extension list.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a file must be decoded before it can be fingerprinted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    /// Still image the `image` crate can decode
    Image,
    /// HEIC/HEIF still, needs the platform converter
    Heif,
    /// Video, fingerprinted through one extracted frame
    Video,
}

/// Extension table, lower-case and without the leading dot
const MEDIA_TABLE: &[(&str, MediaKind)] = &[
    ("png", MediaKind::Image),
    ("jpg", MediaKind::Image),
    ("jpeg", MediaKind::Image),
    ("gif", MediaKind::Image),
    ("bmp", MediaKind::Image),
    ("tiff", MediaKind::Image),
    ("tif", MediaKind::Image),
    ("webp", MediaKind::Image),
    ("heic", MediaKind::Heif),
    ("heif", MediaKind::Heif),
    ("heics", MediaKind::Heif),
    ("heifs", MediaKind::Heif),
    ("mp4", MediaKind::Video),
    ("mov", MediaKind::Video),
    ("mp", MediaKind::Video),
    ("avi", MediaKind::Video),
    ("mkv", MediaKind::Video),
    ("flv", MediaKind::Video),
    ("wmv", MediaKind::Video),
    ("webm", MediaKind::Video),
    ("3gp", MediaKind::Video),
    ("3g2", MediaKind::Video),
    ("m4v", MediaKind::Video),
    ("ts", MediaKind::Video),
    ("mts", MediaKind::Video),
    ("m2ts", MediaKind::Video),
    ("vob", MediaKind::Video),
    ("ogv", MediaKind::Video),
    ("ogg", MediaKind::Video),
    ("qt", MediaKind::Video),
    ("divx", MediaKind::Video),
    ("xvid", MediaKind::Video),
    ("rm", MediaKind::Video),
    ("rmvb", MediaKind::Video),
    ("asf", MediaKind::Video),
    ("amv", MediaKind::Video),
    ("m2v", MediaKind::Video),
    ("mpeg", MediaKind::Video),
    ("mpg", MediaKind::Video),
    ("mpe", MediaKind::Video),
    ("mpv", MediaKind::Video),
    ("mp2", MediaKind::Video),
    ("m2p", MediaKind::Video),
    ("m2t", MediaKind::Video),
];

/// Companion video suffixes of a live photo, in preference order
pub const LIVE_PHOTO_VIDEO_SUFFIXES: &[&str] = &["mp4", "mp", "mov"];

impl MediaKind {
    /// Classify a bare extension (with or without leading dot, any case)
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        MEDIA_TABLE
            .iter()
            .find(|(candidate, _)| *candidate == ext)
            .map(|(_, kind)| *kind)
    }

    /// Classify a path by its extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Every extension of this kind in the table
    pub fn extensions(self) -> impl Iterator<Item = &'static str> {
        MEDIA_TABLE
            .iter()
            .filter(move |(_, kind)| *kind == self)
            .map(|(ext, _)| *ext)
    }
}

/// Every extension the fingerprint engine understands
pub fn known_extensions() -> impl Iterator<Item = &'static str> {
    MEDIA_TABLE.iter().map(|(ext, _)| *ext)
}

/// Lower-cased extension with its leading dot, or empty when there is none
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Path as a string with `/` separators, the key format shared with the
/// metadata tool's output
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_images_case_insensitively() {
        assert_eq!(MediaKind::from_extension("JPG"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_extension(".png"), Some(MediaKind::Image));
        assert_eq!(
            MediaKind::from_path(Path::new("/a/IMG_1.TIFF")),
            Some(MediaKind::Image)
        );
    }

    #[test]
    fn heic_has_its_own_kind() {
        assert_eq!(MediaKind::from_extension("heic"), Some(MediaKind::Heif));
        assert_eq!(MediaKind::from_extension("HEIF"), Some(MediaKind::Heif));
    }

    #[test]
    fn classifies_videos() {
        for ext in ["mp4", "MOV", "mp", "mkv", "m2ts"] {
            assert_eq!(MediaKind::from_extension(ext), Some(MediaKind::Video), "{ext}");
        }
    }

    #[test]
    fn unknown_extension_is_none() {
        assert_eq!(MediaKind::from_extension("txt"), None);
        assert_eq!(MediaKind::from_path(Path::new("/a/no_extension")), None);
    }

    #[test]
    fn live_photo_suffixes_are_videos() {
        for ext in LIVE_PHOTO_VIDEO_SUFFIXES {
            assert_eq!(MediaKind::from_extension(ext), Some(MediaKind::Video));
        }
    }

    #[test]
    fn extension_of_keeps_dot_and_lowercases() {
        assert_eq!(extension_of(Path::new("/a/IMG.PNG")), ".png");
        assert_eq!(extension_of(Path::new("/a/README")), "");
    }

    #[test]
    fn normalize_path_uses_forward_slashes() {
        assert_eq!(
            normalize_path(Path::new(r"C:\Users\me\Pictures\a.jpg")),
            "C:/Users/me/Pictures/a.jpg"
        );
    }

    #[test]
    fn kind_extensions_are_consistent() {
        assert!(MediaKind::Heif.extensions().all(|e| e.starts_with("hei")));
        assert!(known_extensions().count() > 40);
    }
}
