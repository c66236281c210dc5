//! Image acquisition collaborators: where the platform is, and how a frame
//! ends up on disk with its geotag and capture time.

use std::path::{Path, PathBuf};

use image::ImageReader;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::data_loader::list_images;
use crate::error::{Result, VelocityError};
use crate::metadata::{
    CaptureMetadata, FilenameTimestamp, MetadataReader, format_exif_datetime, sidecar_path,
};

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

pub trait PositionOracle {
    fn current_position(&self) -> GeoPosition;
}

/// Oracle that always reports the same position.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub GeoPosition);

impl PositionOracle for FixedPosition {
    fn current_position(&self) -> GeoPosition {
        self.0
    }
}

/// Produces a readable, geotagged still image at `destination`.
pub trait CaptureService {
    fn capture_image(&mut self, destination: &Path) -> Result<()>;
}

/// EXIF GPS tag values for one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpsTags {
    #[serde(rename = "GPSLatitude")]
    pub latitude: String,
    #[serde(rename = "GPSLatitudeRef")]
    pub latitude_ref: String,
    #[serde(rename = "GPSLongitude")]
    pub longitude: String,
    #[serde(rename = "GPSLongitudeRef")]
    pub longitude_ref: String,
}

impl GpsTags {
    pub fn from_position(position: &GeoPosition) -> GpsTags {
        let (south, latitude) = exif_dms(position.latitude);
        let (west, longitude) = exif_dms(position.longitude);
        GpsTags {
            latitude,
            latitude_ref: if south { "S" } else { "N" }.to_string(),
            longitude,
            longitude_ref: if west { "W" } else { "E" }.to_string(),
        }
    }
}

/// Splits an angle into EXIF rational degrees, minutes and tenths of seconds.
///
/// Returns whether the angle is negative and the unsigned `D/1,M/1,S/10` string.
pub fn exif_dms(angle_deg: f64) -> (bool, String) {
    let abs = angle_deg.abs();
    let degrees = abs.trunc();
    let minutes_f = (abs - degrees) * 60.0;
    let minutes = minutes_f.trunc();
    let seconds = (minutes_f - minutes) * 60.0;
    (
        angle_deg < 0.0,
        format!("{:.0}/1,{:.0}/1,{:.0}/10", degrees, minutes, seconds * 10.0),
    )
}

/// Replays a folder of recorded frames as if they were being captured.
///
/// Each capture writes the next frame to the destination (grayscale, format
/// from the destination extension) and a JSON sidecar with the geotag and
/// capture time. The capture time comes from the source file name when it is
/// a nanosecond timestamp, otherwise from the local clock.
pub struct ReplayCapture<P: PositionOracle> {
    frames: Vec<PathBuf>,
    next: usize,
    oracle: P,
}

impl<P: PositionOracle> ReplayCapture<P> {
    pub fn new(frames: Vec<PathBuf>, oracle: P) -> ReplayCapture<P> {
        ReplayCapture {
            frames,
            next: 0,
            oracle,
        }
    }

    pub fn from_folder(folder: &str, oracle: P) -> Result<ReplayCapture<P>> {
        Ok(Self::new(list_images(folder)?, oracle))
    }

    pub fn remaining(&self) -> usize {
        self.frames.len() - self.next
    }
}

impl<P: PositionOracle> CaptureService for ReplayCapture<P> {
    fn capture_image(&mut self, destination: &Path) -> Result<()> {
        let source = self
            .frames
            .get(self.next)
            .ok_or(VelocityError::CaptureExhausted(self.next))?;
        let position = self.oracle.current_position();
        let time_ns = FilenameTimestamp
            .capture_timestamp(source)
            .unwrap_or_else(|_| {
                let now =
                    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
                now.unix_timestamp_nanos() as i64
            });

        ImageReader::open(source)?
            .decode()?
            .to_luma8()
            .save(destination)?;
        let metadata = CaptureMetadata {
            datetime_original: format_exif_datetime(time_ns).map_err(|reason| {
                VelocityError::Metadata {
                    path: destination.display().to_string(),
                    reason,
                }
            })?,
            time_ns: Some(time_ns),
            gps: GpsTags::from_position(&position),
        };
        std::fs::write(
            sidecar_path(destination),
            serde_json::to_string_pretty(&metadata)?,
        )?;
        log::trace!(
            "captured {} from {} at ({:.4}, {:.4})",
            destination.display(),
            source.display(),
            position.latitude,
            position.longitude
        );
        self.next += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dms_of_positive_angle() {
        let (negative, s) = exif_dms(51.5);
        assert!(!negative);
        assert_eq!(s, "51/1,30/1,0/10");
    }

    #[test]
    fn dms_of_negative_angle() {
        // 0.2575 deg = 15 min 27 s
        let (negative, s) = exif_dms(-122.2575);
        assert!(negative);
        assert_eq!(s, "122/1,15/1,270/10");
    }

    #[test]
    fn gps_tags_use_hemisphere_refs() {
        let tags = GpsTags::from_position(&GeoPosition {
            latitude: -33.0,
            longitude: -70.5,
        });
        assert_eq!(tags.latitude_ref, "S");
        assert_eq!(tags.longitude_ref, "W");
        assert_eq!(tags.longitude, "70/1,30/1,0/10");
        let json = serde_json::to_value(&tags).unwrap();
        assert_eq!(json["GPSLatitudeRef"], "S");
    }
}
