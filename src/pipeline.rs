use image::GrayImage;

use crate::config::VelocityConfig;
use crate::displacement::mean_displacement;
use crate::error::{Result, VelocityError};
use crate::features::{FeaturePoint, OrbExtractor};
use crate::matching::{Correspondence, CrossCheckMatcher};
use crate::speed::{SpeedSample, speed_from_displacement};

/// Everything measured for one consecutive image pair.
#[derive(Debug, Clone)]
pub struct PairMeasurement {
    pub sample: SpeedSample,
    pub displacement_px: f64,
    pub source_features: Vec<FeaturePoint>,
    pub target_features: Vec<FeaturePoint>,
    pub correspondences: Vec<Correspondence>,
}

/// Runs extract, match, displace and convert for one image pair.
pub struct PairEstimator {
    config: VelocityConfig,
    extractor: OrbExtractor,
    matcher: CrossCheckMatcher,
}

impl PairEstimator {
    pub fn new(config: VelocityConfig) -> PairEstimator {
        let extractor = OrbExtractor::new(config.extractor.clone());
        let matcher = CrossCheckMatcher::new(config.max_hamming);
        PairEstimator {
            config,
            extractor,
            matcher,
        }
    }

    pub fn config(&self) -> &VelocityConfig {
        &self.config
    }

    /// Speed sample for `previous -> current`, captured `elapsed_s` apart.
    ///
    /// The elapsed time is validated before any image work is done.
    pub fn estimate(
        &self,
        previous: &GrayImage,
        current: &GrayImage,
        elapsed_s: f64,
        pair_index: usize,
    ) -> Result<PairMeasurement> {
        if !elapsed_s.is_finite() || elapsed_s <= 0.0 {
            return Err(VelocityError::InvalidElapsedTime(elapsed_s));
        }
        let source_features = self.extractor.extract(previous);
        if source_features.is_empty() {
            return Err(VelocityError::NoFeatures(pair_index));
        }
        let target_features = self.extractor.extract(current);
        if target_features.is_empty() {
            return Err(VelocityError::NoFeatures(pair_index + 1));
        }
        let correspondences = self
            .matcher
            .match_features(&source_features, &target_features);
        let displacement_px =
            mean_displacement(&source_features, &target_features, &correspondences)?;
        let speed_km_s =
            speed_from_displacement(displacement_px, self.config.gsd_cm_per_px, elapsed_s)?;
        log::debug!(
            "pair {}: {} / {} features, {} matches, {:.3} px in {:.3} s",
            pair_index,
            source_features.len(),
            target_features.len(),
            correspondences.len(),
            displacement_px,
            elapsed_s
        );
        Ok(PairMeasurement {
            sample: SpeedSample {
                pair_index,
                speed_km_s,
            },
            displacement_px,
            source_features,
            target_features,
            correspondences,
        })
    }
}
