use serde::{Deserialize, Serialize};

use crate::aggregator::AcceptanceBand;
use crate::features::ExtractorConfig;

/// Ground sample distance of the reference camera setup, cm per pixel.
pub const DEFAULT_GSD_CM_PER_PX: f64 = 12648.0;

/// Parameters of the image-pair velocity pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityConfig {
    pub extractor: ExtractorConfig,
    /// Optional Hamming ceiling applied after the cross-check.
    pub max_hamming: Option<u32>,
    pub gsd_cm_per_px: f64,
    pub band: AcceptanceBand,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            extractor: ExtractorConfig::default(),
            max_hamming: None,
            gsd_cm_per_px: DEFAULT_GSD_CM_PER_PX,
            band: AcceptanceBand::default(),
        }
    }
}

/// Limits and naming of the acquisition loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub max_duration_s: u64,
    pub max_images: usize,
    pub interval_ms: u64,
    pub image_prefix: String,
    pub image_extension: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_duration_s: 540,
            max_images: 30,
            interval_ms: 1000,
            image_prefix: "photo".to_string(),
            image_extension: "jpg".to_string(),
        }
    }
}

impl SessionConfig {
    /// File name of the `counter`-th capture, e.g. `photo_007.jpg`.
    pub fn image_name(&self, counter: usize) -> String {
        format!(
            "{}_{:03}.{}",
            self.image_prefix, counter, self.image_extension
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_name_is_zero_padded() {
        let config = SessionConfig::default();
        assert_eq!(config.image_name(7), "photo_007.jpg");
        assert_eq!(config.image_name(123), "photo_123.jpg");
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: VelocityConfig = serde_json::from_str(r#"{"gsd_cm_per_px": 100.0}"#).unwrap();
        assert_eq!(config.gsd_cm_per_px, 100.0);
        assert_eq!(config.extractor.max_features, 1000);
        assert_eq!(config.band, AcceptanceBand::default());
    }
}
