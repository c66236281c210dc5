use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, PrimitiveDateTime, format_description};

use crate::capture::GpsTags;
use crate::error::{Result, VelocityError};

/// EXIF `DateTimeOriginal` layout, e.g. `2024:03:18 09:41:07`.
const EXIF_DATETIME: &str = "[year]:[month]:[day] [hour]:[minute]:[second]";

/// Source of capture timestamps, in nanoseconds since the Unix epoch.
pub trait MetadataReader {
    fn capture_timestamp(&self, image_path: &Path) -> Result<i64>;
}

fn metadata_error(path: &Path, reason: impl ToString) -> VelocityError {
    VelocityError::Metadata {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Reads the timestamp from the file stem, which must be nanoseconds since
/// the epoch (`1403636579763555584.png`).
#[derive(Debug, Clone, Copy, Default)]
pub struct FilenameTimestamp;

impl MetadataReader for FilenameTimestamp {
    fn capture_timestamp(&self, image_path: &Path) -> Result<i64> {
        let stem = image_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| metadata_error(image_path, "no file stem"))?;
        stem.parse::<i64>()
            .map_err(|e| metadata_error(image_path, format!("stem {stem:?}: {e}")))
    }
}

/// Metadata stored next to a captured image as `<image>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureMetadata {
    pub datetime_original: String,
    /// Sub-second capture time, preferred over `datetime_original` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_ns: Option<i64>,
    pub gps: GpsTags,
}

pub fn sidecar_path(image_path: &Path) -> PathBuf {
    let mut name = image_path.as_os_str().to_owned();
    name.push(".json");
    PathBuf::from(name)
}

/// Reads timestamps from the JSON sidecars written by the capture service.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarMetadata;

impl SidecarMetadata {
    pub fn read(&self, image_path: &Path) -> Result<CaptureMetadata> {
        let path = sidecar_path(image_path);
        let contents =
            std::fs::read_to_string(&path).map_err(|e| metadata_error(image_path, e))?;
        serde_json::from_str(&contents).map_err(|e| metadata_error(image_path, e))
    }
}

impl MetadataReader for SidecarMetadata {
    fn capture_timestamp(&self, image_path: &Path) -> Result<i64> {
        let meta = self.read(image_path)?;
        match meta.time_ns {
            Some(ns) => Ok(ns),
            None => parse_exif_datetime(&meta.datetime_original)
                .map_err(|e| metadata_error(image_path, e)),
        }
    }
}

/// Parses an EXIF date-time string, taken as UTC, into nanoseconds.
pub fn parse_exif_datetime(value: &str) -> std::result::Result<i64, String> {
    let format = format_description::parse(EXIF_DATETIME).map_err(|e| e.to_string())?;
    let datetime = PrimitiveDateTime::parse(value.trim(), &format)
        .map_err(|e| format!("{value:?}: {e}"))?;
    Ok(datetime.assume_utc().unix_timestamp_nanos() as i64)
}

/// Formats nanoseconds since the epoch as an EXIF date-time string (UTC).
pub fn format_exif_datetime(time_ns: i64) -> std::result::Result<String, String> {
    let format = format_description::parse(EXIF_DATETIME).map_err(|e| e.to_string())?;
    OffsetDateTime::from_unix_timestamp_nanos(time_ns as i128)
        .map_err(|e| e.to_string())?
        .format(&format)
        .map_err(|e| e.to_string())
}
