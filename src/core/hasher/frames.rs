//! Representative-frame extraction for video fingerprints.

use crate::error::HashError;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};

/// Writes one still frame of a video to an image file
pub trait FrameExtractor: Send + Sync {
    /// Render a representative frame of `video` to `output` (PNG)
    fn extract_frame(&self, video: &Path, output: &Path) -> Result<(), HashError>;

    /// Short name for log lines
    fn name(&self) -> &str;
}

impl<T: FrameExtractor + ?Sized> FrameExtractor for Arc<T> {
    fn extract_frame(&self, video: &Path, output: &Path) -> Result<(), HashError> {
        (**self).extract_frame(video, output)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// ffmpeg's `thumbnail` filter picks the most representative frame
#[derive(Debug, Clone)]
pub struct FfmpegFrameExtractor {
    binary: PathBuf,
}

impl FfmpegFrameExtractor {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for FfmpegFrameExtractor {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FrameExtractor for FfmpegFrameExtractor {
    fn extract_frame(&self, video: &Path, output: &Path) -> Result<(), HashError> {
        let tool = self.binary.display().to_string();

        let result = Command::new(&self.binary)
            .args(["-y", "-loglevel", "error", "-i"])
            .arg(video)
            .args(["-vf", "thumbnail", "-frames:v", "1", "-update", "1"])
            .arg(output)
            .output()
            .map_err(|e| HashError::ExternalTool {
                tool: tool.clone(),
                path: video.to_path_buf(),
                reason: e.to_string(),
            })?;

        if !result.status.success() {
            return Err(HashError::ExternalTool {
                tool,
                path: video.to_path_buf(),
                reason: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Test double: writes a fixed frame, or fails, and remembers every output path
#[derive(Debug)]
pub struct InMemoryFrameExtractor {
    frame: Option<DynamicImage>,
    outputs: Mutex<Vec<PathBuf>>,
}

impl InMemoryFrameExtractor {
    /// Always produce `frame`
    pub fn new(frame: DynamicImage) -> Self {
        Self {
            frame: Some(frame),
            outputs: Mutex::new(Vec::new()),
        }
    }

    /// Always fail as if the video were unreadable
    pub fn failing() -> Self {
        Self {
            frame: None,
            outputs: Mutex::new(Vec::new()),
        }
    }

    /// Output paths requested so far
    pub fn outputs(&self) -> Vec<PathBuf> {
        self.outputs
            .lock()
            .map(|outputs| outputs.clone())
            .unwrap_or_default()
    }
}

impl FrameExtractor for InMemoryFrameExtractor {
    fn extract_frame(&self, video: &Path, output: &Path) -> Result<(), HashError> {
        if let Ok(mut outputs) = self.outputs.lock() {
            outputs.push(output.to_path_buf());
        }

        let Some(frame) = &self.frame else {
            // Leave a partial file behind so cleanup is observable
            let _ = std::fs::write(output, b"partial");
            return Err(HashError::ExternalTool {
                tool: self.name().to_string(),
                path: video.to_path_buf(),
                reason: "configured to fail".to_string(),
            });
        };

        frame
            .save_with_format(output, image::ImageFormat::Png)
            .map_err(|e| HashError::DecodeError {
                path: output.to_path_buf(),
                reason: e.to_string(),
            })
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use tempfile::TempDir;

    #[test]
    fn in_memory_extractor_writes_frame_and_records_path() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("frame.png");
        let frame = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(3, 3, Rgb([9u8, 9, 9])));
        let extractor = InMemoryFrameExtractor::new(frame);

        extractor.extract_frame(Path::new("clip.mov"), &output).unwrap();

        assert!(output.exists());
        assert_eq!(extractor.outputs(), vec![output]);
    }

    #[test]
    fn failing_extractor_reports_external_tool_error() {
        let dir = TempDir::new().unwrap();
        let extractor = InMemoryFrameExtractor::failing();

        let result = extractor.extract_frame(Path::new("clip.mov"), &dir.path().join("f.png"));

        assert!(matches!(result, Err(HashError::ExternalTool { .. })));
    }

    #[test]
    fn missing_ffmpeg_is_external_tool_error() {
        let dir = TempDir::new().unwrap();
        let extractor = FfmpegFrameExtractor::new("/nonexistent/ffmpeg-12345");

        let result = extractor.extract_frame(Path::new("clip.mov"), &dir.path().join("f.png"));

        assert!(matches!(result, Err(HashError::ExternalTool { .. })));
    }
}
