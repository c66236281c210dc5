use glam::Vec2;

use crate::error::{Result, VelocityError};
use crate::features::FeaturePoint;
use crate::matching::Correspondence;

/// Resolves each correspondence to its `(source, target)` pixel coordinates.
pub fn matched_coordinates(
    source: &[FeaturePoint],
    target: &[FeaturePoint],
    correspondences: &[Correspondence],
) -> Result<Vec<(Vec2, Vec2)>> {
    correspondences
        .iter()
        .map(|c| {
            let s = source.get(c.source_idx).ok_or(VelocityError::IndexOutOfRange {
                index: c.source_idx,
                len: source.len(),
            })?;
            let t = target.get(c.target_idx).ok_or(VelocityError::IndexOutOfRange {
                index: c.target_idx,
                len: target.len(),
            })?;
            Ok((s.p2d, t.p2d))
        })
        .collect()
}

/// Mean Euclidean distance between matched coordinates, in pixels.
///
/// An empty correspondence set is `NoCorrespondences`, never zero.
pub fn mean_displacement(
    source: &[FeaturePoint],
    target: &[FeaturePoint],
    correspondences: &[Correspondence],
) -> Result<f64> {
    if correspondences.is_empty() {
        return Err(VelocityError::NoCorrespondences);
    }
    let pairs = matched_coordinates(source, target, correspondences)?;
    let total: f64 = pairs
        .iter()
        .map(|(a, b)| {
            let dx = (b.x - a.x) as f64;
            let dy = (b.y - a.y) as f64;
            dx.hypot(dy)
        })
        .sum();
    Ok(total / pairs.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Descriptor;

    fn at(x: f32, y: f32) -> FeaturePoint {
        FeaturePoint {
            p2d: Vec2::new(x, y),
            score: 0.0,
            angle: 0.0,
            descriptor: Descriptor([0; 32]),
        }
    }

    fn pair(s: usize, t: usize) -> Correspondence {
        Correspondence {
            source_idx: s,
            target_idx: t,
            distance: 0,
        }
    }

    #[test]
    fn mean_of_pair_distances() {
        let source = vec![at(0.0, 0.0), at(10.0, 10.0)];
        let target = vec![at(13.0, 14.0), at(3.0, 4.0)];
        let d = mean_displacement(&source, &target, &[pair(0, 1), pair(1, 0)]).unwrap();
        assert!((d - 5.0).abs() < 1e-9);
    }

    #[test]
    fn zero_motion_is_distinct_from_no_data() {
        let source = vec![at(4.0, 4.0)];
        let target = vec![at(4.0, 4.0)];
        assert_eq!(mean_displacement(&source, &target, &[pair(0, 0)]).unwrap(), 0.0);
        assert!(matches!(
            mean_displacement(&source, &target, &[]),
            Err(VelocityError::NoCorrespondences)
        ));
    }

    #[test]
    fn bad_index_is_reported() {
        let source = vec![at(0.0, 0.0)];
        let target = vec![at(1.0, 1.0)];
        assert!(matches!(
            mean_displacement(&source, &target, &[pair(0, 3)]),
            Err(VelocityError::IndexOutOfRange { index: 3, len: 1 })
        ));
    }
}
