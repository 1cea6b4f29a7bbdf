//! # CLI Module
//!
//! Command-line interface for the media deduplicator.
//!
//! ## Usage
//! ```bash
//! # Correct extensions that lie about the file content
//! media-dedup fix-extensions ~/Photos
//!
//! # Fingerprint everything and write duplicates.json
//! media-dedup find-dups ~/Photos
//!
//! # See what would be deleted, then do it
//! media-dedup resolve --dry-run
//! media-dedup resolve
//!
//! # Browse the groups
//! media-dedup report
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use media_dedup::core::pipeline::{FindOutcome, MetadataBackend, Pipeline, PipelineBuilder};
use media_dedup::error::Result;
use media_dedup::events::{
    Event, EventChannel, EventReceiver, FixEvent, GroupEvent, PipelineEvent, PipelinePhase,
    ResolveEvent,
};
use std::path::PathBuf;
use std::thread;

/// Media Dedup - perceptual duplicate finder for photos and videos
#[derive(Parser, Debug)]
#[command(name = "media-dedup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Duplicate log path
    #[arg(long, global = true, default_value = "duplicates.json")]
    log: PathBuf,

    /// Metadata cache path
    #[arg(long, global = true, default_value = "exif_images_info.json")]
    metadata_cache: PathBuf,

    /// HTML report path
    #[arg(long, global = true, default_value = "duplicates.html")]
    report: PathBuf,

    /// exiftool binary
    #[arg(long, global = true, default_value = "exiftool")]
    exiftool: PathBuf,

    /// ffmpeg binary
    #[arg(long, global = true, default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// Where resolution and capture time come from
    #[arg(long, global = true, value_enum, default_value = "exiftool")]
    metadata_backend: Backend,

    /// Include hidden files and directories
    #[arg(long, global = true)]
    include_hidden: bool,

    /// Stop at the first file that cannot be decoded
    #[arg(long, global = true)]
    abort_on_decode_error: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rename files whose content does not match their extension
    FixExtensions {
        /// Directory to fix
        root: PathBuf,
    },
    /// Fingerprint a directory and write the duplicate log
    FindDups {
        /// Directory to scan
        root: PathBuf,
    },
    /// Pick one survivor per group and delete the rest
    Resolve {
        /// Save selections but delete nothing
        #[arg(long)]
        dry_run: bool,
    },
    /// Render the duplicate log as HTML
    Report,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    /// exiftool subprocess (default)
    #[value(name = "exiftool")]
    ExifTool,
    /// Built-in EXIF reader, no external tools
    Exif,
}

impl From<Backend> for MetadataBackend {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::ExifTool => MetadataBackend::ExifTool,
            Backend::Exif => MetadataBackend::Exif,
        }
    }
}

impl Cli {
    fn pipeline(&self) -> PipelineBuilder {
        Pipeline::builder()
            .log_path(&self.log)
            .metadata_cache_path(&self.metadata_cache)
            .report_path(&self.report)
            .exiftool(&self.exiftool)
            .ffmpeg(&self.ffmpeg)
            .metadata_backend(self.metadata_backend.into())
            .include_hidden(self.include_hidden)
            .abort_on_decode_error(self.abort_on_decode_error)
    }
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    media_dedup::init_tracing(cli.verbose);

    let term = Term::stderr();
    term.write_line(&format!(
        "{} {}",
        style("Media Dedup").bold().cyan(),
        style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
    ))
    .ok();

    let (sender, receiver) = EventChannel::new();
    let event_thread = spawn_progress(receiver, cli.verbose);
    let pipeline = cli.pipeline().events(sender).build();

    let result = run_command(&cli, &pipeline, &term);

    // Dropping the pipeline drops the last sender and ends the event thread
    drop(pipeline);
    event_thread.join().ok();

    result
}

fn run_command(cli: &Cli, pipeline: &Pipeline, term: &Term) -> Result<()> {
    match &cli.command {
        Commands::FixExtensions { root } => {
            let summary = pipeline.fix_extensions(root)?;
            term.write_line(&format!(
                "{} {} files scanned, {} renamed, {} sidecars moved",
                style("✓").green().bold(),
                style(summary.files_scanned).cyan(),
                style(summary.renamed.len()).cyan(),
                summary.sidecars_renamed()
            ))
            .ok();
            for error in &summary.errors {
                term.write_line(&format!("  {} {}", style("✗").red(), error)).ok();
            }
        }
        Commands::FindDups { root } => match pipeline.find_duplicates(root)? {
            FindOutcome::Skipped { log_path } => {
                term.write_line(&format!(
                    "{} {} already exists. Delete it to search again.",
                    style("!").yellow().bold(),
                    log_path.display()
                ))
                .ok();
            }
            FindOutcome::Completed(summary) => {
                term.write_line(&format!(
                    "{} {} duplicate groups ({} removable files) written to {}",
                    style("✓").green().bold(),
                    style(summary.groups).cyan(),
                    style(summary.duplicates).cyan(),
                    summary.log_path.display()
                ))
                .ok();
                term.write_line(&format!(
                    "  {} files, {} fingerprinted, {} skipped",
                    summary.files_total,
                    summary.files_hashed,
                    style(summary.files_skipped).dim()
                ))
                .ok();
            }
        },
        Commands::Resolve { dry_run } => {
            let summary = pipeline.resolve(!dry_run)?;
            term.write_line(&format!(
                "{} {} groups resolved, {} already resolved",
                style("✓").green().bold(),
                style(summary.groups_resolved).cyan(),
                summary.groups_already_resolved
            ))
            .ok();

            match &summary.deletion_report {
                Some(report) => {
                    term.write_line(&format!(
                        "  Deleted {} of {} files ({} already gone, {} failed)",
                        style(report.deleted.len()).cyan(),
                        report.attempted(),
                        report.missing.len(),
                        style(report.failed.len()).red()
                    ))
                    .ok();
                }
                None => {
                    if cli.verbose {
                        for path in &summary.deletions {
                            term.write_line(&format!("    {} {}", style("○").dim(), path.display()))
                                .ok();
                        }
                    }
                    term.write_line(&format!(
                        "  {}",
                        style(format!(
                            "Dry run: {} files would be deleted. Nothing was removed.",
                            summary.deletions.len()
                        ))
                        .dim()
                    ))
                    .ok();
                }
            }
        }
        Commands::Report => {
            let path = pipeline.write_report()?;
            term.write_line(&format!(
                "{} Report written to {}",
                style("✓").green().bold(),
                path.display()
            ))
            .ok();
        }
    }

    Ok(())
}

/// Render progress events on a background thread
fn spawn_progress(receiver: EventReceiver, verbose: bool) -> thread::JoinHandle<()> {
    let bar_style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|s| s.progress_chars("█▓░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());

    thread::spawn(move || {
        let pb = ProgressBar::new(0);
        pb.set_style(bar_style);

        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_position(0);
                    pb.set_message(phase.to_string());
                }
                Event::Fix(FixEvent::Started { total_files }) => {
                    pb.set_length(total_files as u64);
                }
                Event::Group(GroupEvent::Started { total_files }) => {
                    pb.set_length(total_files as u64);
                    pb.set_message(PipelinePhase::Fingerprinting.to_string());
                }
                Event::Resolve(ResolveEvent::Started { total_groups }) => {
                    pb.set_length(total_groups as u64);
                }
                Event::Resolve(ResolveEvent::DeletionStarted { total_files }) => {
                    pb.reset();
                    pb.set_length(total_files as u64);
                    pb.set_message(PipelinePhase::Deleting.to_string());
                }
                Event::Fix(FixEvent::Progress(p))
                | Event::Group(GroupEvent::Progress(p))
                | Event::Resolve(ResolveEvent::Progress(p))
                | Event::Resolve(ResolveEvent::DeletionProgress(p)) => {
                    pb.set_position(p.completed as u64);
                    if verbose {
                        pb.set_message(
                            p.current_path
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .into_owned(),
                        );
                    }
                }
                Event::Group(GroupEvent::Skipped { path, reason }) if verbose => {
                    pb.println(format!("  {} {}: {}", style("skip").dim(), path.display(), reason));
                }
                Event::Pipeline(PipelineEvent::Completed) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }

        pb.finish_and_clear();
    })
}
