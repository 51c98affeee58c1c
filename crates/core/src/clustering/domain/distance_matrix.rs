use ndarray::Array2;

use crate::clustering::domain::clustering_error::ClusteringError;
use crate::shared::detection::Detection;

/// Euclidean distance between two descriptors.
///
/// Non-finite components propagate into the result as NaN or infinity.
/// Callers must check dimensions first; extra components on the longer
/// side would otherwise be ignored.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = *x as f64 - *y as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// A pair of detection indices `i < j` and their descriptor distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistancePair {
    pub i: usize,
    pub j: usize,
    pub distance: f64,
}

/// Symmetric, zero-diagonal pairwise descriptor distances for one image.
#[derive(Clone, Debug)]
pub struct DistanceMatrix {
    distances: Array2<f64>,
}

impl DistanceMatrix {
    /// Builds the matrix, failing fast if any descriptor length differs from
    /// the first detection's.
    pub fn from_detections(detections: &[Detection]) -> Result<Self, ClusteringError> {
        check_dimensions(detections)?;

        let n = detections.len();
        let mut distances = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in (i + 1)..n {
                let d = euclidean_distance(&detections[i].descriptor, &detections[j].descriptor);
                distances[[i, j]] = d;
                distances[[j, i]] = d;
            }
        }
        Ok(Self { distances })
    }

    pub fn len(&self) -> usize {
        self.distances.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.distances[[i, j]]
    }

    /// All unordered pairs in index order (`(0,1), (0,2), ..., (1,2), ...`).
    pub fn pairs(&self) -> Vec<DistancePair> {
        let n = self.len();
        let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                pairs.push(DistancePair {
                    i,
                    j,
                    distance: self.distances[[i, j]],
                });
            }
        }
        pairs
    }

    /// All unordered pairs, closest first. NaN distances sort last.
    pub fn sorted_pairs(&self) -> Vec<DistancePair> {
        let mut pairs = self.pairs();
        pairs.sort_by(|a, b| compare_distances(a.distance, b.distance));
        pairs
    }
}

fn compare_distances(a: f64, b: f64) -> std::cmp::Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => a.total_cmp(&b),
        (false, true) => std::cmp::Ordering::Less,
        (true, false) => std::cmp::Ordering::Greater,
        (true, true) => std::cmp::Ordering::Equal,
    }
}

fn check_dimensions(detections: &[Detection]) -> Result<(), ClusteringError> {
    let Some(first) = detections.first() else {
        return Ok(());
    };
    let expected = first.descriptor.len();
    match detections
        .iter()
        .enumerate()
        .find(|(_, d)| d.descriptor.len() != expected)
    {
        Some((index, d)) => Err(ClusteringError::DimensionMismatch {
            index,
            expected,
            found: d.descriptor.len(),
        }),
        None => Ok(()),
    }
}
