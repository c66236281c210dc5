//! ORB-style feature extraction: FAST-9 corners, intensity-centroid
//! orientation and steered BRIEF descriptors.

pub mod brief;
pub mod fast;

use glam::Vec2;
use image::GrayImage;
use serde::{Deserialize, Serialize};

use brief::{BriefPattern, SmoothedImage, intensity_centroid_angle};
use fast::{FastDetector, suppress_non_maxima};

/// 256-bit binary descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Descriptor(pub [u8; 32]);

impl Descriptor {
    pub fn hamming(&self, other: &Descriptor) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }
}

#[derive(Debug, Clone)]
pub struct FeaturePoint {
    pub p2d: Vec2,
    pub score: f32,
    /// Orientation in radians.
    pub angle: f32,
    pub descriptor: Descriptor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub max_features: usize,
    pub fast_threshold: u8,
    /// Minimum distance of a feature to the image edge, in pixels.
    pub edge_threshold: u32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_features: 1000,
            fast_threshold: 20,
            edge_threshold: 31,
        }
    }
}

pub struct OrbExtractor {
    config: ExtractorConfig,
    detector: FastDetector,
    pattern: BriefPattern,
}

impl OrbExtractor {
    pub fn new(config: ExtractorConfig) -> OrbExtractor {
        let detector = FastDetector::new(config.fast_threshold, 9, config.edge_threshold);
        OrbExtractor {
            config,
            detector,
            pattern: BriefPattern::standard(),
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Up to `max_features` oriented, described features, strongest first.
    ///
    /// An image without enough texture yields an empty vector.
    pub fn extract(&self, image: &GrayImage) -> Vec<FeaturePoint> {
        if self.config.max_features == 0 {
            return Vec::new();
        }
        let (w, h) = image.dimensions();
        let corners = self.detector.detect(image);
        let mut corners = suppress_non_maxima(&corners, w, h);
        // stable sort keeps raster order among equal scores
        corners.sort_by(|a, b| b.score.total_cmp(&a.score));
        corners.truncate(self.config.max_features);
        log::trace!("{}x{} image: {} corners kept", w, h, corners.len());
        if corners.is_empty() {
            log::debug!("no features found in {}x{} image", w, h);
            return Vec::new();
        }

        let smoothed = SmoothedImage::new(image);
        corners
            .iter()
            .map(|c| {
                let angle = intensity_centroid_angle(image, c.x, c.y);
                let (x, y) = (c.x as f32, c.y as f32);
                FeaturePoint {
                    p2d: Vec2::new(x, y),
                    score: c.score,
                    angle,
                    descriptor: self.pattern.describe(&smoothed, x, y, angle),
                }
            })
            .collect()
    }
}

/// Extracts up to `max_features` features with the default detector settings.
pub fn extract_features(image: &GrayImage, max_features: usize) -> Vec<FeaturePoint> {
    OrbExtractor::new(ExtractorConfig {
        max_features,
        ..Default::default()
    })
    .extract(image)
}
