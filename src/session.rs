use std::path::Path;
use std::time::{Duration, Instant};

use crate::aggregator::{SessionAggregator, SessionEstimate};
use crate::capture::CaptureService;
use crate::config::SessionConfig;
use crate::data_loader::{Frame, load_frame};
use crate::error::Result;
use crate::metadata::MetadataReader;
use crate::pipeline::PairEstimator;
use crate::speed::{SpeedSample, elapsed_seconds};

/// What an acquisition session captured and concluded.
pub struct SessionRun {
    pub captured: usize,
    pub samples: Vec<SpeedSample>,
    /// `Err(EmptySession)` when fewer than two usable frames were captured.
    pub estimate: Result<SessionEstimate>,
}

/// Runs the capture loop until the duration or image limit is reached.
///
/// Frames are written to `workdir` as `<prefix>_NNN.<ext>`. Each frame after
/// the first is paired with its predecessor; pairs that fail are logged and
/// skipped. A capture failure ends the loop early with what was collected.
pub fn run_session<C, M>(
    capture: &mut C,
    metadata: &M,
    estimator: &PairEstimator,
    workdir: &Path,
    config: &SessionConfig,
) -> SessionRun
where
    C: CaptureService + ?Sized,
    M: MetadataReader + ?Sized,
{
    let start = Instant::now();
    let limit = Duration::from_secs(config.max_duration_s);
    let interval = Duration::from_millis(config.interval_ms);
    let mut aggregator = SessionAggregator::new(estimator.config().band);
    let mut previous: Option<Frame> = None;
    let mut counter = 1;

    while start.elapsed() < limit && counter <= config.max_images {
        let path = workdir.join(config.image_name(counter));
        if let Err(e) = capture.capture_image(&path) {
            log::warn!("capture {} failed, ending session: {}", counter, e);
            break;
        }
        log::info!("iteration photo {}", counter);
        std::thread::sleep(interval);

        let current = match load_frame(&path, metadata) {
            Ok(frame) => Some(frame),
            Err(e) => {
                log::warn!("cannot read {}: {}", path.display(), e);
                None
            }
        };
        if let (Some(prev), Some(curr)) = (&previous, &current) {
            let pair_index = counter - 2;
            let outcome = elapsed_seconds(prev.time_ns, curr.time_ns).and_then(|elapsed| {
                estimator.estimate(&prev.image, &curr.image, elapsed, pair_index)
            });
            match outcome {
                Ok(m) => aggregator.add_sample(m.sample),
                Err(e) => log::warn!("pair {} skipped: {}", pair_index, e),
            }
        }
        previous = current;
        counter += 1;
    }

    let samples = aggregator.samples().to_vec();
    SessionRun {
        captured: counter - 1,
        samples,
        estimate: aggregator.finalize(),
    }
}
