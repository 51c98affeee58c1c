use crate::clustering::domain::clustering_error::ClusteringError;
use crate::shared::detection::Detection;

/// Domain interface for grouping one image's detections by identity.
///
/// Returns groups of indices into `detections`. Groups partition the input:
/// every index appears in exactly one non-empty group.
pub trait FaceClusterer: Send + Sync {
    fn cluster_indices(&self, detections: &[Detection])
        -> Result<Vec<Vec<usize>>, ClusteringError>;
}
