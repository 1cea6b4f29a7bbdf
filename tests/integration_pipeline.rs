//! End-to-end tests for the find → resolve → report pipeline.
//!
//! Metadata comes from an in-memory provider and video frames from an
//! in-memory extractor, so no external tools are needed.

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use media_dedup::core::duplicates::DuplicateLog;
use media_dedup::core::hasher::InMemoryFrameExtractor;
use media_dedup::core::metadata::InMemoryMetadataProvider;
use media_dedup::core::pipeline::{FindOutcome, FindSummary, Pipeline};
use media_dedup::events::{Event, EventChannel, GroupEvent};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn checkerboard() -> DynamicImage {
    DynamicImage::ImageRgb8(ImageBuffer::from_fn(64, 64, |x, y| {
        if (x / 16 + y / 16) % 2 == 0 {
            Rgb([255u8, 255, 255])
        } else {
            Rgb([0u8, 0, 0])
        }
    }))
}

fn gradient() -> DynamicImage {
    DynamicImage::ImageRgb8(ImageBuffer::from_fn(64, 64, |x, y| {
        Rgb([(x * 4) as u8, (y * 4) as u8, 128])
    }))
}

/// Two directories: the photo tree and a work dir for the log, cache and report
struct Fixture {
    photos: TempDir,
    work: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            photos: TempDir::new().unwrap(),
            work: TempDir::new().unwrap(),
        }
    }

    fn save(&self, name: &str, image: &DynamicImage, format: ImageFormat) -> PathBuf {
        let path = self.photos.path().join(name);
        image.save_with_format(&path, format).unwrap();
        path
    }

    fn log_path(&self) -> PathBuf {
        self.work.path().join("duplicates.json")
    }

    fn pipeline(&self, metadata: InMemoryMetadataProvider) -> Pipeline {
        Pipeline::builder()
            .log_path(self.log_path())
            .metadata_cache_path(self.work.path().join("exif_images_info.json"))
            .report_path(self.work.path().join("duplicates.html"))
            .metadata_provider(Box::new(metadata))
            .frame_extractor(Box::new(InMemoryFrameExtractor::failing()))
            .build()
    }
}

fn completed(outcome: FindOutcome) -> FindSummary {
    match outcome {
        FindOutcome::Completed(summary) => summary,
        FindOutcome::Skipped { log_path } => panic!("search skipped: {}", log_path.display()),
    }
}

fn key(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[test]
fn same_picture_in_two_formats_is_grouped_and_the_larger_kept() {
    let fx = Fixture::new();
    let small = fx.save("small.png", &checkerboard(), ImageFormat::Png);
    let large = fx.save("large.bmp", &checkerboard(), ImageFormat::Bmp);
    let other = fx.save("other.png", &gradient(), ImageFormat::Png);

    let metadata = InMemoryMetadataProvider::default()
        .with_record(&small, Some("64x64"), Some("2021:06:01 10:00:00"))
        .with_record(&large, Some("128x128"), Some("2021:06:01 10:00:00"))
        .with_record(&other, Some("64x64"), None);
    let pipeline = fx.pipeline(metadata);

    let summary = completed(pipeline.find_duplicates(fx.photos.path()).unwrap());
    assert_eq!(summary.groups, 1);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.files_hashed, 3);

    let log = DuplicateLog::load(&fx.log_path()).unwrap();
    let (fingerprint, group) = log.groups().next().unwrap();
    assert_eq!(fingerprint.len(), 16);
    assert_eq!(group.len(), 2);

    // Dry run records the choice but touches nothing
    let dry = pipeline.resolve(false).unwrap();
    assert_eq!(dry.deletions, vec![small.clone()]);
    assert!(dry.deletion_report.is_none());
    assert!(small.exists());

    let saved = DuplicateLog::load(&fx.log_path()).unwrap();
    let survivor = saved
        .groups()
        .flat_map(|(_, group)| group.iter())
        .find(|m| m.is_selected())
        .unwrap();
    assert_eq!(survivor.path, key(&large));

    let real = pipeline.resolve(true).unwrap();
    assert_eq!(real.groups_already_resolved, 1);
    let report = real.deletion_report.unwrap();
    assert_eq!(report.deleted, vec![small.clone()]);
    assert!(!small.exists());
    assert!(large.exists());
    assert!(other.exists());
}

#[test]
fn second_resolve_keeps_the_same_survivor_and_tolerates_missing_files() {
    let fx = Fixture::new();
    let a = fx.save("a.png", &checkerboard(), ImageFormat::Png);
    let b = fx.save("b.png", &checkerboard(), ImageFormat::Png);

    let metadata = InMemoryMetadataProvider::default()
        .with_record(&a, Some("64x64"), Some("2020:01:01 00:00:00"))
        .with_record(&b, Some("64x64"), Some("2022:01:01 00:00:00"));
    let pipeline = fx.pipeline(metadata);

    completed(pipeline.find_duplicates(fx.photos.path()).unwrap());

    let first = pipeline.resolve(true).unwrap();
    assert_eq!(first.groups_resolved, 1);
    assert_eq!(first.deletion_report.unwrap().deleted, vec![b.clone()]);

    let second = pipeline.resolve(true).unwrap();
    assert_eq!(second.groups_resolved, 0);
    assert_eq!(second.groups_already_resolved, 1);
    assert_eq!(second.deletions, vec![b.clone()]);

    let report = second.deletion_report.unwrap();
    assert!(report.deleted.is_empty());
    assert_eq!(report.missing, vec![b]);
    assert!(a.exists());
}

#[test]
fn live_photo_video_goes_with_its_still() {
    let fx = Fixture::new();
    let keep = fx.save("IMG_0001.png", &checkerboard(), ImageFormat::Png);
    let lose = fx.save("IMG_0002.png", &checkerboard(), ImageFormat::Png);
    let video = fx.photos.path().join("IMG_0002.mov");
    fs::write(&video, b"not really a movie").unwrap();

    let metadata = InMemoryMetadataProvider::default()
        .with_record(&keep, Some("200x100"), None)
        .with_record(&lose, Some("100x100"), None);
    let pipeline = fx.pipeline(metadata);

    let summary = completed(pipeline.find_duplicates(fx.photos.path()).unwrap());
    // The video cannot be fingerprinted by the failing extractor
    assert_eq!(summary.files_skipped, 1);

    let log = DuplicateLog::load(&fx.log_path()).unwrap();
    let member = log
        .groups()
        .flat_map(|(_, group)| group.iter())
        .find(|m| m.path == key(&lose))
        .unwrap();
    assert_eq!(member.linked_video.as_deref(), Some(key(&video).as_str()));

    let resolved = pipeline.resolve(true).unwrap();
    assert_eq!(resolved.deletions, vec![lose.clone(), video.clone()]);
    assert!(!lose.exists());
    assert!(!video.exists());
    assert!(keep.exists());
}

#[test]
fn videos_are_grouped_through_their_extracted_frame() {
    let fx = Fixture::new();
    let still = fx.save("still.png", &checkerboard(), ImageFormat::Png);
    let clip = fx.photos.path().join("clip.mp4");
    fs::write(&clip, b"frames").unwrap();

    let metadata = InMemoryMetadataProvider::default()
        .with_record(&still, Some("64x64"), None)
        .with_record(&clip, Some("1920x1080"), None);
    let pipeline = Pipeline::builder()
        .log_path(fx.log_path())
        .metadata_cache_path(fx.work.path().join("exif_images_info.json"))
        .metadata_provider(Box::new(metadata))
        .frame_extractor(Box::new(InMemoryFrameExtractor::new(checkerboard())))
        .build();

    let summary = completed(pipeline.find_duplicates(fx.photos.path()).unwrap());
    assert_eq!(summary.groups, 1);

    let resolved = pipeline.resolve(false).unwrap();
    assert_eq!(resolved.deletions, vec![still]);
}

#[test]
fn corrupt_files_are_skipped_not_fatal() {
    let fx = Fixture::new();
    let good = fx.save("good.png", &gradient(), ImageFormat::Png);
    fs::write(fx.photos.path().join("broken.jpg"), b"definitely not a jpeg").unwrap();

    let metadata = InMemoryMetadataProvider::default().with_record(&good, Some("64x64"), None);
    let summary = completed(fx.pipeline(metadata).find_duplicates(fx.photos.path()).unwrap());

    assert_eq!(summary.files_total, 2);
    assert_eq!(summary.files_hashed, 1);
    assert_eq!(summary.files_skipped, 1);
    assert_eq!(summary.groups, 0);
}

#[test]
fn existing_log_short_circuits_the_search() {
    let fx = Fixture::new();
    let a = fx.save("a.png", &checkerboard(), ImageFormat::Png);
    let metadata = InMemoryMetadataProvider::default().with_record(&a, Some("64x64"), None);
    let pipeline = fx.pipeline(metadata);

    completed(pipeline.find_duplicates(fx.photos.path()).unwrap());
    let before = fs::read_to_string(fx.log_path()).unwrap();

    fx.save("b.png", &checkerboard(), ImageFormat::Png);
    let outcome = pipeline.find_duplicates(fx.photos.path()).unwrap();

    assert!(matches!(outcome, FindOutcome::Skipped { .. }));
    assert_eq!(fs::read_to_string(fx.log_path()).unwrap(), before);
}

#[test]
fn grouping_reports_progress_events() {
    let fx = Fixture::new();
    let a = fx.save("a.png", &checkerboard(), ImageFormat::Png);
    let b = fx.save("b.png", &checkerboard(), ImageFormat::Png);
    let metadata = InMemoryMetadataProvider::default()
        .with_record(&a, Some("64x64"), None)
        .with_record(&b, Some("64x64"), None);

    let (sender, receiver) = EventChannel::new();
    let pipeline = Pipeline::builder()
        .log_path(fx.log_path())
        .metadata_cache_path(fx.work.path().join("exif_images_info.json"))
        .metadata_provider(Box::new(metadata))
        .frame_extractor(Box::new(InMemoryFrameExtractor::failing()))
        .events(sender)
        .build();

    completed(pipeline.find_duplicates(fx.photos.path()).unwrap());
    drop(pipeline);

    let events: Vec<Event> = receiver.iter().collect();
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::Group(GroupEvent::Started { total_files: 2 }))));
    assert!(events.iter().any(|e| matches!(
        e,
        Event::Group(GroupEvent::Completed {
            total_groups: 1,
            total_duplicates: 1
        })
    )));
}

#[test]
fn report_marks_keep_and_delete() {
    let fx = Fixture::new();
    let a = fx.save("a.png", &checkerboard(), ImageFormat::Png);
    let b = fx.save("b.bmp", &checkerboard(), ImageFormat::Bmp);
    let metadata = InMemoryMetadataProvider::default()
        .with_record(&a, Some("64x64"), None)
        .with_record(&b, Some("64x64"), None);
    let pipeline = fx.pipeline(metadata);

    completed(pipeline.find_duplicates(fx.photos.path()).unwrap());
    pipeline.resolve(false).unwrap();
    let report = pipeline.write_report().unwrap();

    let html = fs::read_to_string(report).unwrap();
    assert!(html.contains(">Keep</span>"));
    assert!(html.contains(">Delete</span>"));
    assert!(html.contains("a.png"));
}
