use std::io::Write;

use serde::{Serialize, de::DeserializeOwned};

use crate::aggregator::{AcceptanceBand, SessionEstimate};
use crate::error::Result;
use crate::speed::SpeedSample;

/// Serializes an object to a JSON file.
pub fn object_to_json<T: Serialize>(output_path: &str, object: &T) -> Result<()> {
    let j = serde_json::to_string_pretty(object)?;
    let mut file = std::fs::File::create(output_path)?;
    file.write_all(j.as_bytes())?;
    Ok(())
}

/// Deserializes an object from a JSON file.
pub fn object_from_json<T: DeserializeOwned>(file_path: &str) -> Result<T> {
    let contents = std::fs::read_to_string(file_path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Result line: three decimals from 10 km/s upwards, four below.
pub fn format_speed(speed_km_s: f64) -> String {
    if speed_km_s / 10.0 >= 1.0 {
        format!("{:5.3} km/s", speed_km_s)
    } else {
        format!("{:5.4} km/s", speed_km_s)
    }
}

/// Writes the single-line result artifact.
pub fn write_result(output_path: &str, estimate: &SessionEstimate) -> Result<()> {
    let mut file = std::fs::File::create(output_path)?;
    file.write_all(format_speed(estimate.speed_km_s).as_bytes())?;
    Ok(())
}

#[derive(Serialize)]
struct SessionReport<'a> {
    timestamp: String,
    estimate: &'a SessionEstimate,
    band: AcceptanceBand,
    gsd_cm_per_px: f64,
    samples: Vec<SampleReport>,
}

#[derive(Serialize)]
struct SampleReport {
    pair_index: usize,
    speed_km_s: f64,
    in_band: bool,
}

/// Writes the estimate and every sample behind it as pretty JSON.
pub fn write_report(
    output_path: &str,
    estimate: &SessionEstimate,
    samples: &[SpeedSample],
    band: AcceptanceBand,
    gsd_cm_per_px: f64,
) -> Result<()> {
    let timestamp = time::OffsetDateTime::now_utc().unix_timestamp();
    let report = SessionReport {
        timestamp: timestamp.to_string(),
        estimate,
        band,
        gsd_cm_per_px,
        samples: samples
            .iter()
            .map(|s| SampleReport {
                pair_index: s.pair_index,
                speed_km_s: s.speed_km_s,
                in_band: band.contains(s.speed_km_s),
            })
            .collect(),
    };
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(output_path, json)?;
    Ok(())
}
