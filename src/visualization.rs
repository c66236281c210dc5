use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rerun::{RecordingStream, RecordingStreamResult, TimeCell};

use crate::data_loader::Frame;
use crate::pipeline::PairMeasurement;

pub fn create_recording(output_rrd: &str) -> RecordingStreamResult<RecordingStream> {
    rerun::RecordingStreamBuilder::new("ground_speed").save(output_rrd)
}

pub fn id_to_color(id: usize) -> rerun::Color {
    let mut rng = ChaCha8Rng::seed_from_u64(id as u64);
    let color_num = rng.random_range(0..2u32.pow(24));
    rerun::Color::from_unmultiplied_rgba(
        ((color_num >> 16) % 256) as u8,
        ((color_num >> 8) % 256) as u8,
        (color_num % 256) as u8,
        255,
    )
}

/// rerun use top left corner as (0, 0)
pub fn rerun_shift(p2ds: &[(f32, f32)]) -> Vec<(f32, f32)> {
    p2ds.iter().map(|(x, y)| (*x + 0.5, *y + 0.5)).collect()
}

pub fn log_frame(
    recording: &RecordingStream,
    topic: &str,
    frame: &Frame,
) -> RecordingStreamResult<()> {
    recording.set_time(
        "capture",
        TimeCell::from_timestamp_nanos_since_epoch(frame.time_ns),
    );
    let (w, h) = frame.image.dimensions();
    recording.log(
        format!("{}/image", topic),
        &rerun::Image::from_l8(frame.image.as_raw().clone(), [w, h]),
    )
}

/// Logs the matched features of one pair as arrows from their position in
/// the earlier frame to their position in the later one.
pub fn log_pair(
    recording: &RecordingStream,
    topic: &str,
    measurement: &PairMeasurement,
    time_ns: i64,
) -> RecordingStreamResult<()> {
    let (origins, vectors): (Vec<_>, Vec<_>) = measurement
        .correspondences
        .iter()
        .filter_map(|c| {
            let s = measurement.source_features.get(c.source_idx)?;
            let t = measurement.target_features.get(c.target_idx)?;
            Some(((s.p2d.x, s.p2d.y), (t.p2d.x - s.p2d.x, t.p2d.y - s.p2d.y)))
        })
        .unzip();
    let color = id_to_color(measurement.sample.pair_index);

    recording.set_time("capture", TimeCell::from_timestamp_nanos_since_epoch(time_ns));
    recording.log(
        format!("{}/matches", topic),
        &rerun::Arrows2D::from_vectors(vectors)
            .with_origins(rerun_shift(&origins))
            .with_colors([color]),
    )?;
    recording.log(
        format!("{}/log", topic),
        &rerun::TextLog::new(format!(
            "pair {}: {:.4} km/s, {:.2} px",
            measurement.sample.pair_index,
            measurement.sample.speed_km_s,
            measurement.displacement_px
        )),
    )
}
