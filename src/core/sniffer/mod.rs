//! # Sniffer Module
//!
//! Determines a file's true media type from its leading bytes, independent
//! of its extension, and renames files whose extension lies.
//!
//! ## Signatures
//! | Type | Bytes |
//! |------|-------|
//! | PNG  | `89 50 4E 47 0D 0A 1A 0A` |
//! | GIF  | `GIF89a` / `GIF87a` |
//! | JPEG | `FF D8 FF` |
//! | HEIC | ISO-BMFF `ftyp` box with a HEIF brand |
//! | MOV  | ISO-BMFF `ftyp` box with brand `qt  ` |
//! | MP4  | ISO-BMFF `ftyp` box with an MP4 brand (`isom`, `mp42`, ...) |
//!
//! Other ISO-BMFF brands (3GPP, AVIF, M4A, CR3, ...) are unknown and never renamed.
//! | TIFF | `II*\0` / `MM\0*` |
//! | WEBP | `RIFF....WEBP` |
//! | BMP  | `BM` |

mod fixer;

pub use fixer::{ExtensionFixer, FixSummary, Rename};

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Longest prefix any signature needs
const SNIFF_LEN: usize = 12;

const HEIF_BRANDS: &[&[u8; 4]] = &[
    b"heic", b"heix", b"heim", b"heis", b"hevc", b"hevx", b"mif1", b"msf1",
];

const MP4_BRANDS: &[&[u8; 4]] = &[
    b"isom", b"iso2", b"iso3", b"iso4", b"iso5", b"iso6", b"mp41", b"mp42", b"avc1", b"M4V ",
    b"M4VH", b"M4VP", b"mmp4", b"dash", b"MSNV", b"f4v ",
];

/// Media type established from file content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    Png,
    Gif,
    Jpeg,
    Heic,
    Tiff,
    Mp4,
    Mov,
    Webp,
    Bmp,
}

impl MediaType {
    /// Extension a file of this type should carry, without the dot
    pub fn canonical_extension(&self) -> &'static str {
        match self {
            MediaType::Png => "png",
            MediaType::Gif => "gif",
            MediaType::Jpeg => "jpg",
            MediaType::Heic => "heic",
            MediaType::Tiff => "tiff",
            MediaType::Mp4 => "mp4",
            MediaType::Mov => "mov",
            MediaType::Webp => "webp",
            MediaType::Bmp => "bmp",
        }
    }

    /// Whether `ext` (no dot, any case) is an accepted spelling for this type
    pub fn matches_extension(&self, ext: &str) -> bool {
        let ext = ext.to_ascii_lowercase();
        let aliases: &[&str] = match self {
            MediaType::Jpeg => &["jpg", "jpeg"],
            MediaType::Tiff => &["tiff", "tif"],
            MediaType::Heic => &["heic", "heif"],
            MediaType::Mp4 => &["mp4", "m4v"],
            MediaType::Mov => &["mov", "qt"],
            other => return ext == other.canonical_extension(),
        };
        aliases.contains(&ext.as_str())
    }

    /// Match a header against the signature table
    pub fn from_header(header: &[u8]) -> Option<Self> {
        if header.starts_with(b"\x89PNG\r\n\x1a\n") {
            return Some(MediaType::Png);
        }
        if header.starts_with(b"GIF89a") || header.starts_with(b"GIF87a") {
            return Some(MediaType::Gif);
        }
        if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(MediaType::Jpeg);
        }
        if header.len() >= 12 && &header[4..8] == b"ftyp" {
            let brand = &header[8..12];
            if HEIF_BRANDS.iter().any(|b| &b[..] == brand) {
                return Some(MediaType::Heic);
            }
            if brand == b"qt  " {
                return Some(MediaType::Mov);
            }
            if MP4_BRANDS.iter().any(|b| &b[..] == brand) {
                return Some(MediaType::Mp4);
            }
            return None;
        }
        if header.starts_with(b"II*\0") || header.starts_with(b"MM\0*") {
            return Some(MediaType::Tiff);
        }
        if header.len() >= 12 && header.starts_with(b"RIFF") && &header[8..12] == b"WEBP" {
            return Some(MediaType::Webp);
        }
        if header.starts_with(b"BM") {
            return Some(MediaType::Bmp);
        }
        None
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical_extension().to_ascii_uppercase())
    }
}

/// Sniff a file's type from its first bytes.
///
/// Unreadable or too-short files are `None`, never an error.
pub fn detect_type(path: &Path) -> Option<MediaType> {
    let mut file = File::open(path).ok()?;
    let mut header = [0u8; SNIFF_LEN];
    let mut filled = 0;

    // A single read may return short on some filesystems
    while filled < SNIFF_LEN {
        match file.read(&mut header[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(_) => return None,
        }
    }

    MediaType::from_header(&header[..filled])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        File::create(&path).unwrap().write_all(bytes).unwrap();
        path
    }

    #[test]
    fn detects_png_regardless_of_extension() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "photo.jpg", b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR");
        assert_eq!(detect_type(&path), Some(MediaType::Png));
    }

    #[test]
    fn detects_jpeg_and_gif() {
        assert_eq!(
            MediaType::from_header(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0]),
            Some(MediaType::Jpeg)
        );
        assert_eq!(MediaType::from_header(b"GIF89a\x01\0"), Some(MediaType::Gif));
    }

    #[test]
    fn detects_heic_brand_at_offset_four() {
        let header = b"\0\0\0\x18ftypheic\0\0\0\0";
        assert_eq!(MediaType::from_header(header), Some(MediaType::Heic));
    }

    #[test]
    fn distinguishes_mov_from_mp4() {
        assert_eq!(
            MediaType::from_header(b"\0\0\0\x14ftypqt  \0\0"),
            Some(MediaType::Mov)
        );
        assert_eq!(
            MediaType::from_header(b"\0\0\0\x20ftypmp42\0\0"),
            Some(MediaType::Mp4)
        );
        assert_eq!(
            MediaType::from_header(b"\0\0\0\x1cftypisom\0\0"),
            Some(MediaType::Mp4)
        );
    }

    #[test]
    fn other_iso_bmff_brands_are_unknown() {
        assert_eq!(MediaType::from_header(b"\0\0\0\x18ftyp3gp4\0\0"), None);
        assert_eq!(MediaType::from_header(b"\0\0\0\x18ftyp3g2a\0\0"), None);
        assert_eq!(MediaType::from_header(b"\0\0\0\x1cftypavif\0\0"), None);
        assert_eq!(MediaType::from_header(b"\0\0\0\x20ftypM4A \0\0"), None);
        assert_eq!(MediaType::from_header(b"\0\0\0\x18ftypcrx \0\0"), None);
    }

    #[test]
    fn detects_webp_tiff_bmp() {
        assert_eq!(
            MediaType::from_header(b"RIFF\x24\0\0\0WEBPVP8 "),
            Some(MediaType::Webp)
        );
        assert_eq!(MediaType::from_header(b"II*\0\x08\0"), Some(MediaType::Tiff));
        assert_eq!(MediaType::from_header(b"BM\x36\0"), Some(MediaType::Bmp));
    }

    #[test]
    fn riff_without_webp_tag_is_unknown() {
        assert_eq!(MediaType::from_header(b"RIFF\x24\0\0\0WAVEfmt "), None);
    }

    #[test]
    fn short_or_empty_file_is_unknown() {
        let dir = TempDir::new().unwrap();
        let empty = write_file(&dir, "empty.jpg", b"");
        let short = write_file(&dir, "short.jpg", b"\xFF");
        assert_eq!(detect_type(&empty), None);
        assert_eq!(detect_type(&short), None);
    }

    #[test]
    fn missing_file_is_unknown() {
        assert_eq!(detect_type(Path::new("/nonexistent/file.png")), None);
    }

    #[test]
    fn extension_aliases() {
        assert!(MediaType::Jpeg.matches_extension("JPEG"));
        assert!(MediaType::Jpeg.matches_extension("jpg"));
        assert!(MediaType::Tiff.matches_extension("tif"));
        assert!(MediaType::Png.matches_extension("PNG"));
        assert!(!MediaType::Png.matches_extension("jpg"));
    }
}
