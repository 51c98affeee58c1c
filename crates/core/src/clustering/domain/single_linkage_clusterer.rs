//! Single-linkage identity clustering over descriptor distance.
//!
//! Two detections end up in the same group when any chain of pairwise
//! distances strictly below the threshold connects them. Pairs are merged
//! closest first, but the resulting partition does not depend on that order.

use crate::clustering::domain::clustering_error::ClusteringError;
use crate::clustering::domain::disjoint_set::DisjointSet;
use crate::clustering::domain::distance_matrix::DistanceMatrix;
use crate::clustering::domain::face_clusterer::FaceClusterer;
use crate::shared::constants::DEFAULT_DISTANCE_THRESHOLD;
use crate::shared::detection::Detection;

pub struct SingleLinkageClusterer {
    threshold: f64,
}

impl SingleLinkageClusterer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for SingleLinkageClusterer {
    fn default() -> Self {
        Self::new(DEFAULT_DISTANCE_THRESHOLD)
    }
}

impl FaceClusterer for SingleLinkageClusterer {
    fn cluster_indices(
        &self,
        detections: &[Detection],
    ) -> Result<Vec<Vec<usize>>, ClusteringError> {
        match detections.len() {
            0 => return Ok(Vec::new()),
            1 => return Ok(vec![vec![0]]),
            _ => {}
        }

        let matrix = DistanceMatrix::from_detections(detections)?;
        log_distances(&matrix);

        let mut set = DisjointSet::new(matrix.len());
        for pair in matrix.sorted_pairs() {
            // NaN never compares below the threshold, so it never merges.
            if pair.distance < self.threshold {
                set.union(pair.i, pair.j);
            }
        }
        Ok(set.groups())
    }
}

/// Groups `detections` into identities, returning owned detections per group.
pub fn cluster(
    detections: &[Detection],
    distance_threshold: f64,
) -> Result<Vec<Vec<Detection>>, ClusteringError> {
    let groups = SingleLinkageClusterer::new(distance_threshold).cluster_indices(detections)?;
    Ok(groups
        .into_iter()
        .map(|g| g.into_iter().map(|i| detections[i].clone()).collect())
        .collect())
}

fn log_distances(matrix: &DistanceMatrix) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    log::debug!("Distance matrix:");
    for pair in matrix.pairs() {
        log::debug!("  Face {} <-> Face {}: {:.4}", pair.i, pair.j, pair.distance);
    }
}
