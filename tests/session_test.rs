mod common;

use common::write_pass;
use ground_speed::capture::{FixedPosition, GeoPosition, ReplayCapture};
use ground_speed::config::{SessionConfig, VelocityConfig};
use ground_speed::data_loader::{estimate_folder, list_images};
use ground_speed::metadata::{FilenameTimestamp, MetadataReader, SidecarMetadata};
use ground_speed::session::run_session;
use ground_speed::{PairEstimator, VelocityError};
use tempfile::TempDir;

fn estimator() -> PairEstimator {
    // 10 px per second at 70000 cm/px is 7 km/s
    PairEstimator::new(VelocityConfig {
        max_hamming: Some(10),
        gsd_cm_per_px: 70000.0,
        ..Default::default()
    })
}

fn fast_session(max_images: usize) -> SessionConfig {
    SessionConfig {
        max_images,
        interval_ms: 0,
        image_extension: "png".to_string(),
        ..Default::default()
    }
}

fn iss_position() -> FixedPosition {
    FixedPosition(GeoPosition {
        latitude: -12.5,
        longitude: 101.25,
    })
}

#[test]
fn test_offline_folder_estimate() {
    let dir = TempDir::new().unwrap();
    write_pass(dir.path(), 5, 6, 8);
    std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

    let folder = dir.path().to_str().unwrap();
    assert_eq!(list_images(folder).unwrap().len(), 5);

    let run = estimate_folder(folder, &FilenameTimestamp, &estimator()).unwrap();
    assert_eq!(run.measurements.len(), 4);
    let estimate = run.estimate.unwrap();
    assert!((estimate.speed_km_s - 7.0).abs() < 1e-9);
    assert_eq!(estimate.valid_samples, 4);
    assert_eq!(estimate.total_samples, 4);
}

#[test]
fn test_offline_folder_without_timestamps_is_empty_session() {
    let dir = TempDir::new().unwrap();
    for path in write_pass(dir.path(), 3, 6, 8) {
        let renamed = path.with_file_name(format!(
            "frame_{}",
            path.file_name().unwrap().to_str().unwrap()
        ));
        std::fs::rename(&path, renamed).unwrap();
    }
    let run = estimate_folder(dir.path().to_str().unwrap(), &FilenameTimestamp, &estimator())
        .unwrap();
    assert!(run.frames.iter().all(|f| f.is_none()));
    assert!(matches!(run.estimate, Err(VelocityError::EmptySession)));
}

#[test]
fn test_replay_session() {
    let source = TempDir::new().unwrap();
    let workdir = TempDir::new().unwrap();
    write_pass(source.path(), 5, 6, 8);

    let mut capture =
        ReplayCapture::from_folder(source.path().to_str().unwrap(), iss_position()).unwrap();
    let run = run_session(
        &mut capture,
        &SidecarMetadata,
        &estimator(),
        workdir.path(),
        &fast_session(30),
    );

    assert_eq!(run.captured, 5);
    assert_eq!(run.samples.len(), 4);
    let pair_indices: Vec<usize> = run.samples.iter().map(|s| s.pair_index).collect();
    assert_eq!(pair_indices, vec![0, 1, 2, 3]);
    let estimate = run.estimate.unwrap();
    assert!((estimate.speed_km_s - 7.0).abs() < 1e-9);

    let third = workdir.path().join("photo_003.png");
    assert!(third.exists());
    let meta = SidecarMetadata.read(&third).unwrap();
    assert_eq!(meta.time_ns, Some(3_000_000_000));
    assert_eq!(meta.gps.latitude_ref, "S");
    assert_eq!(meta.gps.longitude, "101/1,15/1,0/10");
    assert_eq!(SidecarMetadata.capture_timestamp(&third).unwrap(), 3_000_000_000);
}

#[test]
fn test_replay_session_respects_image_limit() {
    let source = TempDir::new().unwrap();
    let workdir = TempDir::new().unwrap();
    write_pass(source.path(), 5, 6, 8);

    let mut capture =
        ReplayCapture::from_folder(source.path().to_str().unwrap(), iss_position()).unwrap();
    let run = run_session(
        &mut capture,
        &SidecarMetadata,
        &estimator(),
        workdir.path(),
        &fast_session(3),
    );
    assert_eq!(run.captured, 3);
    assert_eq!(run.samples.len(), 2);
    assert_eq!(capture.remaining(), 2);
    assert!(!workdir.path().join("photo_004.png").exists());
}

#[test]
fn test_single_capture_is_empty_session() {
    let source = TempDir::new().unwrap();
    let workdir = TempDir::new().unwrap();
    write_pass(source.path(), 1, 6, 8);

    let mut capture =
        ReplayCapture::from_folder(source.path().to_str().unwrap(), iss_position()).unwrap();
    let run = run_session(
        &mut capture,
        &SidecarMetadata,
        &estimator(),
        workdir.path(),
        &fast_session(30),
    );
    assert_eq!(run.captured, 1);
    assert!(run.samples.is_empty());
    assert!(matches!(run.estimate, Err(VelocityError::EmptySession)));
}

#[test]
fn test_zero_duration_session_captures_nothing() {
    let source = TempDir::new().unwrap();
    let workdir = TempDir::new().unwrap();
    write_pass(source.path(), 3, 6, 8);

    let mut capture =
        ReplayCapture::from_folder(source.path().to_str().unwrap(), iss_position()).unwrap();
    let config = SessionConfig {
        max_duration_s: 0,
        ..fast_session(30)
    };
    let run = run_session(&mut capture, &SidecarMetadata, &estimator(), workdir.path(), &config);
    assert_eq!(run.captured, 0);
    assert!(matches!(run.estimate, Err(VelocityError::EmptySession)));
}
