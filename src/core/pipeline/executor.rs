//! Pipeline execution implementation.

use crate::core::duplicates::DuplicateLog;
use crate::core::grouper::{DuplicateGrouper, GrouperConfig};
use crate::core::hasher::{
    FfmpegFrameExtractor, Fingerprinter, FrameExtractor, HasherConfig, HeifConverter,
};
use crate::core::metadata::{
    CachedMetadataProvider, ExifMetadataProvider, ExifToolProvider, MetadataProvider,
};
use crate::core::reporter::export_to_file;
use crate::core::resolver::{DeletionReport, Resolver};
use crate::core::scanner::ScanConfig;
use crate::core::sniffer::{ExtensionFixer, FixSummary};
use crate::error::{DedupError, ScanError};
use crate::events::{null_sender, Event, EventSender, PipelineEvent, PipelinePhase};
use std::path::{Path, PathBuf};
use tracing::info;

/// Where per-file metadata comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetadataBackend {
    /// `exiftool` subprocess
    #[default]
    ExifTool,
    /// In-process EXIF reader
    Exif,
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Duplicate log written by find and rewritten by resolve
    pub log_path: PathBuf,
    pub metadata_cache_path: PathBuf,
    pub report_path: PathBuf,
    pub exiftool: PathBuf,
    pub ffmpeg: PathBuf,
    pub heif_converter: HeifConverter,
    pub metadata_backend: MetadataBackend,
    /// Hash edge length, 8 gives the 16-hex-char log keys
    pub hash_size: u32,
    pub include_hidden: bool,
    pub abort_on_decode_error: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("duplicates.json"),
            metadata_cache_path: PathBuf::from("exif_images_info.json"),
            report_path: PathBuf::from("duplicates.html"),
            exiftool: PathBuf::from("exiftool"),
            ffmpeg: PathBuf::from("ffmpeg"),
            heif_converter: HeifConverter::default(),
            metadata_backend: MetadataBackend::default(),
            hash_size: 8,
            include_hidden: false,
            abort_on_decode_error: false,
        }
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
    metadata: Option<Box<dyn MetadataProvider>>,
    frames: Option<Box<dyn FrameExtractor>>,
    events: EventSender,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            metadata: None,
            frames: None,
            events: null_sender(),
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.log_path = path.into();
        self
    }

    pub fn metadata_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.metadata_cache_path = path.into();
        self
    }

    pub fn report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.report_path = path.into();
        self
    }

    pub fn exiftool(mut self, binary: impl Into<PathBuf>) -> Self {
        self.config.exiftool = binary.into();
        self
    }

    pub fn ffmpeg(mut self, binary: impl Into<PathBuf>) -> Self {
        self.config.ffmpeg = binary.into();
        self
    }

    pub fn heif_converter(mut self, converter: HeifConverter) -> Self {
        self.config.heif_converter = converter;
        self
    }

    pub fn metadata_backend(mut self, backend: MetadataBackend) -> Self {
        self.config.metadata_backend = backend;
        self
    }

    pub fn hash_size(mut self, size: u32) -> Self {
        self.config.hash_size = size;
        self
    }

    /// Include hidden files
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.include_hidden = include;
        self
    }

    pub fn abort_on_decode_error(mut self, abort: bool) -> Self {
        self.config.abort_on_decode_error = abort;
        self
    }

    /// Use this provider instead of the configured backend.
    ///
    /// It is still wrapped in the metadata cache.
    pub fn metadata_provider(mut self, provider: Box<dyn MetadataProvider>) -> Self {
        self.metadata = Some(provider);
        self
    }

    /// Use this extractor instead of ffmpeg
    pub fn frame_extractor(mut self, frames: Box<dyn FrameExtractor>) -> Self {
        self.frames = Some(frames);
        self
    }

    /// Send progress events here
    pub fn events(mut self, events: EventSender) -> Self {
        self.events = events;
        self
    }

    pub fn build(self) -> Pipeline {
        let config = self.config;

        let inner: Box<dyn MetadataProvider> = match self.metadata {
            Some(provider) => provider,
            None => match config.metadata_backend {
                MetadataBackend::ExifTool => Box::new(ExifToolProvider::new(&config.exiftool)),
                MetadataBackend::Exif => {
                    Box::new(ExifMetadataProvider::new().include_hidden(config.include_hidden))
                }
            },
        };
        let metadata = CachedMetadataProvider::new(inner, &config.metadata_cache_path);

        let frames: Box<dyn FrameExtractor> = match self.frames {
            Some(frames) => frames,
            None => Box::new(FfmpegFrameExtractor::new(&config.ffmpeg)),
        };
        let fingerprinter = HasherConfig::new()
            .hash_size(config.hash_size)
            .heif_converter(config.heif_converter.clone())
            .build(frames);

        Pipeline {
            config,
            metadata,
            fingerprinter,
            events: self.events,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of `find_duplicates`
#[derive(Debug)]
pub enum FindOutcome {
    /// A log already existed and was left alone
    Skipped { log_path: PathBuf },
    Completed(FindSummary),
}

#[derive(Debug)]
pub struct FindSummary {
    pub log_path: PathBuf,
    pub groups: usize,
    /// Files that would go if every group kept one
    pub duplicates: usize,
    pub files_total: usize,
    pub files_hashed: usize,
    pub files_skipped: usize,
}

/// Result of `resolve`
#[derive(Debug)]
pub struct ResolveSummary {
    pub groups_resolved: usize,
    pub groups_already_resolved: usize,
    pub deletions: Vec<PathBuf>,
    /// `None` on a dry run
    pub deletion_report: Option<DeletionReport>,
}

/// The deduplication pipeline
pub struct Pipeline {
    config: PipelineConfig,
    metadata: CachedMetadataProvider,
    fingerprinter: Fingerprinter,
    events: EventSender,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn phase(&self, phase: PipelinePhase) {
        info!("{}", phase);
        self.events
            .send(Event::Pipeline(PipelineEvent::PhaseChanged { phase }));
    }

    /// Rename files whose content disagrees with their extension
    pub fn fix_extensions(&self, root: &Path) -> Result<FixSummary, DedupError> {
        self.events.send(Event::Pipeline(PipelineEvent::Started));
        self.phase(PipelinePhase::FixingExtensions);

        let fixer = ExtensionFixer::new().with_scan_config(ScanConfig {
            include_hidden: true,
            ..Default::default()
        });
        let summary = fixer.fix_tree_with_events(root, &self.events)?;

        info!(
            "Scanned {} files, renamed {} ({} sidecars), {} errors",
            summary.files_scanned,
            summary.renamed.len(),
            summary.sidecars_renamed(),
            summary.errors.len()
        );
        self.events.send(Event::Pipeline(PipelineEvent::Completed));
        Ok(summary)
    }

    /// Fingerprint `root` and write the duplicate log.
    ///
    /// Does nothing when the log already exists; delete it to start over.
    pub fn find_duplicates(&self, root: &Path) -> Result<FindOutcome, DedupError> {
        let log_path = self.config.log_path.clone();
        if log_path.exists() {
            info!(
                "{} already exists, skipping duplicate search",
                log_path.display()
            );
            return Ok(FindOutcome::Skipped { log_path });
        }

        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            }
            .into());
        }
        let root = std::path::absolute(root).map_err(|source| ScanError::ReadDirectory {
            path: root.to_path_buf(),
            source,
        })?;

        self.events.send(Event::Pipeline(PipelineEvent::Started));
        self.phase(PipelinePhase::CollectingMetadata);

        let grouper = DuplicateGrouper::new(
            &self.metadata,
            &self.fingerprinter,
            GrouperConfig {
                include_hidden: self.config.include_hidden,
                follow_symlinks: false,
                abort_on_decode_error: self.config.abort_on_decode_error,
            },
        );
        let outcome = grouper.group_duplicates(&root, &self.events)?;

        outcome.log.save(&log_path)?;
        info!("Duplicate log written to {}", log_path.display());
        self.events.send(Event::Pipeline(PipelineEvent::Completed));

        Ok(FindOutcome::Completed(FindSummary {
            log_path,
            groups: outcome.log.len(),
            duplicates: outcome.log.total_duplicates(),
            files_total: outcome.files_total,
            files_hashed: outcome.files_hashed,
            files_skipped: outcome.files_skipped,
        }))
    }

    /// Select survivors, save the log, and delete the rest when `delete` is set
    pub fn resolve(&self, delete: bool) -> Result<ResolveSummary, DedupError> {
        self.events.send(Event::Pipeline(PipelineEvent::Started));
        self.phase(PipelinePhase::Resolving);

        let mut log = DuplicateLog::load(&self.config.log_path)?;
        let resolver = Resolver::new();
        let outcome = resolver.resolve(&mut log, &self.events);
        log.save(&self.config.log_path)?;

        let deletion_report = if delete {
            self.phase(PipelinePhase::Deleting);
            Some(resolver.delete(&outcome.deletions, &self.events))
        } else {
            for path in &outcome.deletions {
                info!("Would delete {}", path.display());
            }
            info!("Dry run: {} files left in place", outcome.deletions.len());
            None
        };

        self.events.send(Event::Pipeline(PipelineEvent::Completed));
        Ok(ResolveSummary {
            groups_resolved: outcome.groups_resolved,
            groups_already_resolved: outcome.groups_already_resolved,
            deletions: outcome.deletions,
            deletion_report,
        })
    }

    /// Render the duplicate log to the configured HTML report
    pub fn write_report(&self) -> Result<PathBuf, DedupError> {
        self.phase(PipelinePhase::Reporting);

        let log = DuplicateLog::load(&self.config.log_path)?;
        export_to_file(&log, &self.config.report_path)?;

        info!("Report written to {}", self.config.report_path.display());
        Ok(self.config.report_path.clone())
    }
}
