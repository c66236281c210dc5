use serde::{Deserialize, Serialize};

use crate::error::{Result, VelocityError};
use crate::speed::SpeedSample;

/// Open interval of plausible speeds, km/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceBand {
    pub min_km_s: f64,
    pub max_km_s: f64,
}

impl Default for AcceptanceBand {
    fn default() -> Self {
        Self {
            min_km_s: 6.0,
            max_km_s: 8.0,
        }
    }
}

impl AcceptanceBand {
    pub fn contains(&self, speed_km_s: f64) -> bool {
        speed_km_s > self.min_km_s && speed_km_s < self.max_km_s
    }
}

/// Final speed of a session plus the bookkeeping behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionEstimate {
    pub speed_km_s: f64,
    pub valid_samples: usize,
    pub total_samples: usize,
    /// No sample fell inside the band; the mean of all samples was used.
    pub used_fallback: bool,
}

/// Collects per-pair speed samples and reduces them once at session end.
///
/// The estimate is the mean of the in-band samples, or the mean of every
/// sample when none is in band. `finalize` consumes the aggregator.
#[derive(Debug, Clone, Default)]
pub struct SessionAggregator {
    band: AcceptanceBand,
    samples: Vec<SpeedSample>,
}

impl SessionAggregator {
    pub fn new(band: AcceptanceBand) -> SessionAggregator {
        SessionAggregator {
            band,
            samples: Vec::new(),
        }
    }

    pub fn band(&self) -> AcceptanceBand {
        self.band
    }

    /// Appends a sample. Non-finite speeds are logged and dropped.
    pub fn add_sample(&mut self, sample: SpeedSample) {
        if !sample.speed_km_s.is_finite() {
            log::warn!(
                "dropping non-finite speed {} from pair {}",
                sample.speed_km_s,
                sample.pair_index
            );
            return;
        }
        log::debug!(
            "pair {}: {:.4} km/s{}",
            sample.pair_index,
            sample.speed_km_s,
            if self.band.contains(sample.speed_km_s) {
                ""
            } else {
                " (out of band)"
            }
        );
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[SpeedSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn finalize(self) -> Result<SessionEstimate> {
        let total_samples = self.samples.len();
        if total_samples == 0 {
            return Err(VelocityError::EmptySession);
        }
        // summing in sorted order makes the mean independent of arrival order
        let mut values: Vec<f64> = self.samples.iter().map(|s| s.speed_km_s).collect();
        values.sort_by(f64::total_cmp);
        let valid: Vec<f64> = values
            .iter()
            .copied()
            .filter(|&v| self.band.contains(v))
            .collect();

        let (speed_km_s, used_fallback) = if valid.is_empty() {
            (values.iter().sum::<f64>() / total_samples as f64, true)
        } else {
            (valid.iter().sum::<f64>() / valid.len() as f64, false)
        };
        log::info!(
            "session estimate {:.4} km/s from {}/{} in-band samples{}",
            speed_km_s,
            valid.len(),
            total_samples,
            if used_fallback { " (fallback to all)" } else { "" }
        );
        Ok(SessionEstimate {
            speed_km_s,
            valid_samples: valid.len(),
            total_samples,
            used_fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_is_open() {
        let band = AcceptanceBand::default();
        assert!(!band.contains(6.0));
        assert!(!band.contains(8.0));
        assert!(band.contains(6.0001));
        assert!(band.contains(7.9999));
    }

    #[test]
    fn non_finite_samples_are_not_stored() {
        let mut agg = SessionAggregator::default();
        agg.add_sample(SpeedSample {
            pair_index: 0,
            speed_km_s: f64::INFINITY,
        });
        assert!(agg.is_empty());
        assert!(matches!(agg.finalize(), Err(VelocityError::EmptySession)));
    }
}
