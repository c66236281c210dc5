use std::path::{Path, PathBuf};

use glob::glob;
use image::{GrayImage, ImageReader};
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;

use crate::aggregator::{AcceptanceBand, SessionAggregator, SessionEstimate};
use crate::error::Result;
use crate::metadata::MetadataReader;
use crate::pipeline::{PairEstimator, PairMeasurement};

/// A decoded grayscale frame and its capture time.
pub struct Frame {
    pub path: PathBuf,
    pub time_ns: i64,
    pub image: GrayImage,
}

fn img_filter(rp: glob::GlobResult) -> Option<PathBuf> {
    if let Ok(p) = rp {
        let name = p.as_os_str().to_string_lossy().to_lowercase();
        for ext in &[".png", ".jpg", ".jpeg"] {
            if name.ends_with(ext) {
                return Some(p);
            }
        }
    }
    None
}

/// Image files directly inside `folder`, sorted by name.
pub fn list_images(folder: &str) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/*", folder.trim_end_matches('/'));
    let mut paths: Vec<PathBuf> = glob(&pattern)?.filter_map(img_filter).collect();
    paths.sort();
    log::trace!("{} images in {}", paths.len(), folder);
    Ok(paths)
}

pub fn load_frame<M: MetadataReader + ?Sized>(path: &Path, metadata: &M) -> Result<Frame> {
    let time_ns = metadata.capture_timestamp(path)?;
    let image = ImageReader::open(path)?.decode()?.to_luma8();
    Ok(Frame {
        path: path.to_path_buf(),
        time_ns,
        image,
    })
}

/// Decodes frames in parallel. Frames that fail to load are logged and left
/// as `None` so the pairs around them are skipped.
pub fn load_frames<M: MetadataReader + Sync + ?Sized>(
    paths: &[PathBuf],
    metadata: &M,
) -> Vec<Option<Frame>> {
    paths
        .par_iter()
        .progress_count(paths.len() as u64)
        .map(|path| match load_frame(path, metadata) {
            Ok(frame) => Some(frame),
            Err(e) => {
                log::warn!("skipping {}: {}", path.display(), e);
                None
            }
        })
        .collect()
}

/// Estimates every consecutive pair in parallel.
///
/// Returns `(pair_index, outcome)` in capture order for pairs whose frames
/// both loaded.
pub fn estimate_pairs(
    frames: &[Option<Frame>],
    estimator: &PairEstimator,
) -> Vec<(usize, Result<PairMeasurement>)> {
    let pair_count = frames.len().saturating_sub(1);
    (0..pair_count)
        .into_par_iter()
        .progress_count(pair_count as u64)
        .filter_map(|i| {
            let (Some(previous), Some(current)) = (&frames[i], &frames[i + 1]) else {
                log::warn!("pair {} skipped: missing frame", i);
                return None;
            };
            let outcome = crate::speed::elapsed_seconds(previous.time_ns, current.time_ns)
                .and_then(|elapsed| {
                    estimator.estimate(&previous.image, &current.image, elapsed, i)
                });
            Some((i, outcome))
        })
        .collect()
}

/// Feeds successful pairs to an aggregator and finalizes it.
///
/// Failed pairs are logged and contribute no sample.
pub fn aggregate_pairs(
    outcomes: Vec<(usize, Result<PairMeasurement>)>,
    band: AcceptanceBand,
) -> (Result<SessionEstimate>, Vec<PairMeasurement>) {
    let mut aggregator = SessionAggregator::new(band);
    let mut measurements = Vec::new();
    for (i, outcome) in outcomes {
        match outcome {
            Ok(m) => {
                aggregator.add_sample(m.sample);
                measurements.push(m);
            }
            Err(e) => log::warn!("pair {} skipped: {}", i, e),
        }
    }
    (aggregator.finalize(), measurements)
}

/// Outcome of an offline run over a folder of frames.
pub struct BatchRun {
    pub frames: Vec<Option<Frame>>,
    pub measurements: Vec<PairMeasurement>,
    /// `Err(EmptySession)` when no pair produced a sample.
    pub estimate: Result<SessionEstimate>,
}

/// Offline run over every image in `folder`.
pub fn estimate_folder<M: MetadataReader + Sync + ?Sized>(
    folder: &str,
    metadata: &M,
    estimator: &PairEstimator,
) -> Result<BatchRun> {
    let paths = list_images(folder)?;
    log::info!("loading {} frames from {}", paths.len(), folder);
    let frames = load_frames(&paths, metadata);
    let outcomes = estimate_pairs(&frames, estimator);
    let (estimate, measurements) = aggregate_pairs(outcomes, estimator.config().band);
    Ok(BatchRun {
        frames,
        measurements,
        estimate,
    })
}
