use serde::{Deserialize, Serialize};

use crate::error::{Result, VelocityError};

const CM_PER_KM: f64 = 100000.0;

/// One speed measurement, tagged with the ordinal of its image pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedSample {
    pub pair_index: usize,
    pub speed_km_s: f64,
}

/// Ground speed in km/s from a pixel displacement over `elapsed_s` seconds.
pub fn speed_from_displacement(
    displacement_px: f64,
    gsd_cm_per_px: f64,
    elapsed_s: f64,
) -> Result<f64> {
    if !elapsed_s.is_finite() || elapsed_s <= 0.0 {
        return Err(VelocityError::InvalidElapsedTime(elapsed_s));
    }
    if !displacement_px.is_finite() || displacement_px < 0.0 {
        return Err(VelocityError::InvalidDisplacement(displacement_px));
    }
    Ok(displacement_px * gsd_cm_per_px / CM_PER_KM / elapsed_s)
}

/// Seconds between two capture timestamps given in nanoseconds.
pub fn elapsed_seconds(earlier_ns: i64, later_ns: i64) -> Result<f64> {
    let elapsed = (later_ns as i128 - earlier_ns as i128) as f64 / 1e9;
    if elapsed <= 0.0 {
        return Err(VelocityError::InvalidElapsedTime(elapsed));
    }
    Ok(elapsed)
}
