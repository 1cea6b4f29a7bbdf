//! Metadata provider backed by the `exiftool` binary.

use super::{MetadataProvider, RawMetadata};
use crate::error::MetadataError;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Runs `exiftool -ImageSize -DateTimeOriginal -j -r <root>` once per tree
#[derive(Debug, Clone)]
pub struct ExifToolProvider {
    binary: PathBuf,
}

impl ExifToolProvider {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn tool_name(&self) -> String {
        self.binary.display().to_string()
    }

    fn run(&self, command: &mut Command) -> Result<String, MetadataError> {
        let output = command.output().map_err(|e| MetadataError::ToolFailed {
            tool: self.tool_name(),
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(MetadataError::ToolFailed {
                tool: self.tool_name(),
                reason: format!(
                    "exit status {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if stdout.trim().is_empty() {
            return Err(MetadataError::EmptyOutput {
                tool: self.tool_name(),
            });
        }

        Ok(stdout)
    }
}

impl Default for ExifToolProvider {
    fn default() -> Self {
        Self::new("exiftool")
    }
}

impl MetadataProvider for ExifToolProvider {
    fn collect(&self, root: &Path) -> Result<Vec<RawMetadata>, MetadataError> {
        info!("Running {} to extract image/video info...", self.tool_name());

        let stdout = self.run(
            Command::new(&self.binary)
                .args(["-ImageSize", "-DateTimeOriginal", "-j", "-r"])
                .arg(root),
        )?;

        let records: Vec<RawMetadata> =
            serde_json::from_str(&stdout).map_err(|source| MetadataError::Parse {
                origin: self.tool_name(),
                source,
            })?;

        debug!("{} returned {} records", self.tool_name(), records.len());
        Ok(records)
    }

    fn supported_extensions(&self) -> Result<Vec<String>, MetadataError> {
        let stdout = self.run(Command::new(&self.binary).arg("-listf"))?;
        Ok(parse_listf(&stdout))
    }

    fn name(&self) -> &str {
        "exiftool"
    }
}

/// Extract the extension list from `exiftool -listf` output.
///
/// Extensions are on indented lines, space separated, upper-case.
pub fn parse_listf(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| line.starts_with(char::is_whitespace))
        .flat_map(str::split_whitespace)
        .map(str::to_ascii_lowercase)
        .collect()
}
