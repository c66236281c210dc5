use serde::{Deserialize, Serialize};

use crate::features::FeaturePoint;

/// Index pair into the source and target feature lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correspondence {
    pub source_idx: usize,
    pub target_idx: usize,
    /// Hamming distance between the two descriptors.
    pub distance: u32,
}

/// Brute-force Hamming matcher with a mutual nearest neighbour cross-check.
#[derive(Debug, Clone, Default)]
pub struct CrossCheckMatcher {
    /// Pairs above this distance are dropped after the cross-check.
    pub max_distance: Option<u32>,
}

impl CrossCheckMatcher {
    pub fn new(max_distance: Option<u32>) -> CrossCheckMatcher {
        CrossCheckMatcher { max_distance }
    }

    /// Mutual best matches sorted by ascending distance.
    pub fn match_features(
        &self,
        source: &[FeaturePoint],
        target: &[FeaturePoint],
    ) -> Vec<Correspondence> {
        if source.is_empty() || target.is_empty() {
            return Vec::new();
        }
        let forward: Vec<(usize, u32)> = source
            .iter()
            .map(|s| best_candidate(s, target))
            .collect();
        let backward: Vec<usize> = target
            .iter()
            .map(|t| best_candidate(t, source).0)
            .collect();

        let mut matches: Vec<Correspondence> = forward
            .iter()
            .enumerate()
            .filter(|(source_idx, (target_idx, _))| backward[*target_idx] == *source_idx)
            .map(|(source_idx, &(target_idx, distance))| Correspondence {
                source_idx,
                target_idx,
                distance,
            })
            .filter(|c| self.max_distance.is_none_or(|max| c.distance <= max))
            .collect();
        matches.sort_by_key(|c| (c.distance, c.source_idx));
        log::trace!(
            "{} x {} features -> {} mutual matches",
            source.len(),
            target.len(),
            matches.len()
        );
        matches
    }
}

/// Index and distance of the closest descriptor; ties go to the lowest index.
fn best_candidate(query: &FeaturePoint, candidates: &[FeaturePoint]) -> (usize, u32) {
    let mut best = (0, u32::MAX);
    for (i, c) in candidates.iter().enumerate() {
        let d = query.descriptor.hamming(&c.descriptor);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

/// Cross-checked matches without a distance ceiling.
pub fn match_features(source: &[FeaturePoint], target: &[FeaturePoint]) -> Vec<Correspondence> {
    CrossCheckMatcher::default().match_features(source, target)
}
