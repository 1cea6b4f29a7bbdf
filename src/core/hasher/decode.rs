//! Image decoding with format-specific paths.
//!
//! JPEG goes through zune-jpeg in non-strict mode so truncated files still
//! yield whatever was decoded. Everything else uses the image crate with the
//! format sniffed from content and no dimension limits. HEIC/HEIF is first
//! rendered to PNG by a platform converter.

use crate::error::HashError;
use image::{DynamicImage, ImageBuffer, ImageReader, Luma, Rgb, Rgba};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use tracing::debug;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Decode a still image from disk
pub fn decode_image(path: &Path) -> Result<DynamicImage, HashError> {
    if is_jpeg(path) {
        match decode_jpeg(path) {
            Ok(image) => return Ok(image),
            Err(e) => debug!("zune-jpeg could not decode {}: {}", path.display(), e),
        }
    }
    decode_fallback(path)
}

fn is_jpeg(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("jpg" | "jpeg")
    )
}

fn decode_jpeg(path: &Path) -> Result<DynamicImage, HashError> {
    let file_bytes = fs::read(path).map_err(|source| HashError::IoError {
        path: path.to_path_buf(),
        source,
    })?;

    let options = DecoderOptions::new_fast()
        .jpeg_set_out_colorspace(ColorSpace::RGB)
        .set_strict_mode(false);
    let mut decoder = JpegDecoder::new_with_options(&file_bytes, options);

    let pixels = decoder.decode().map_err(|e| HashError::DecodeError {
        path: path.to_path_buf(),
        reason: format!("zune-jpeg: {:?}", e),
    })?;

    let info = decoder.info().ok_or_else(|| HashError::DecodeError {
        path: path.to_path_buf(),
        reason: "missing JPEG header info".to_string(),
    })?;
    let width = info.width as u32;
    let height = info.height as u32;

    let buffer_error = || HashError::DecodeError {
        path: path.to_path_buf(),
        reason: "pixel buffer does not match image size".to_string(),
    };

    match decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB) {
        ColorSpace::RGB => ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, pixels)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(buffer_error),
        ColorSpace::RGBA => ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, pixels)
            .map(DynamicImage::ImageRgba8)
            .ok_or_else(buffer_error),
        ColorSpace::Luma => ImageBuffer::<Luma<u8>, _>::from_raw(width, height, pixels)
            .map(DynamicImage::ImageLuma8)
            .ok_or_else(buffer_error),
        other => Err(HashError::DecodeError {
            path: path.to_path_buf(),
            reason: format!("unsupported JPEG colorspace {:?}", other),
        }),
    }
}

fn decode_fallback(path: &Path) -> Result<DynamicImage, HashError> {
    let io_error = |source| HashError::IoError {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ImageReader::open(path)
        .map_err(io_error)?
        .with_guessed_format()
        .map_err(io_error)?;
    reader.no_limits();

    reader.decode().map_err(|e| HashError::DecodeError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Command-line style of a HEIC converter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConverterStyle {
    /// `sips -s format png <in> --out <out>`
    Sips,
    /// `heif-convert <in> <out>`
    HeifConvert,
}

/// External tool that renders HEIC/HEIF stills to PNG
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeifConverter {
    program: PathBuf,
    style: ConverterStyle,
}

impl HeifConverter {
    /// macOS built-in converter
    pub fn sips(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            style: ConverterStyle::Sips,
        }
    }

    /// libheif's example converter, common on Linux
    pub fn heif_convert(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            style: ConverterStyle::HeifConvert,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Convert `path` inside a scratch directory and decode the result.
    ///
    /// The scratch directory is removed when this returns, on every path.
    pub fn decode(&self, path: &Path) -> Result<DynamicImage, HashError> {
        let scratch = TempDir::new().map_err(|source| HashError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        let converted = scratch.path().join("converted.png");

        let mut command = Command::new(&self.program);
        match self.style {
            ConverterStyle::Sips => {
                command
                    .args(["-s", "format", "png"])
                    .arg(path)
                    .arg("--out")
                    .arg(&converted);
            }
            ConverterStyle::HeifConvert => {
                command.arg(path).arg(&converted);
            }
        }

        let tool = self.program.display().to_string();
        let output = command.output().map_err(|e| HashError::ExternalTool {
            tool: tool.clone(),
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(HashError::ExternalTool {
                tool,
                path: path.to_path_buf(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        decode_fallback(&converted).map_err(|e| HashError::DecodeError {
            path: path.to_path_buf(),
            reason: format!("converted HEIC unreadable: {}", e),
        })
    }
}

impl Default for HeifConverter {
    #[cfg(target_os = "macos")]
    fn default() -> Self {
        Self::sips("sips")
    }

    #[cfg(not(target_os = "macos"))]
    fn default() -> Self {
        Self::heif_convert("heif-convert")
    }
}
