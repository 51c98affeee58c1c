use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clustering::domain::clustering_error::ClusteringError;
use crate::clustering::domain::face_clusterer::FaceClusterer;
use crate::clustering::domain::single_linkage_clusterer::SingleLinkageClusterer;
use crate::detection::domain::detection_order::DetectionOrder;
use crate::detection::domain::overlap_deduplicator::dedupe;
use crate::shared::constants::{DEFAULT_DISTANCE_THRESHOLD, DEFAULT_IOU_THRESHOLD};
use crate::shared::detection::Detection;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CountConfigError {
    #[error("IoU threshold must be between 0.0 and 1.0, got {0}")]
    IouThreshold(f64),
    #[error("distance threshold must be a finite non-negative number, got {0}")]
    DistanceThreshold(f64),
}

/// Thresholds and ordering for counting individuals in one image.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CountConfig {
    pub iou_threshold: f64,
    pub distance_threshold: f64,
    #[serde(default)]
    pub order: DetectionOrder,
}

impl CountConfig {
    pub fn validate(&self) -> Result<(), CountConfigError> {
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(CountConfigError::IouThreshold(self.iou_threshold));
        }
        if !self.distance_threshold.is_finite() || self.distance_threshold < 0.0 {
            return Err(CountConfigError::DistanceThreshold(self.distance_threshold));
        }
        Ok(())
    }
}

impl Default for CountConfig {
    fn default() -> Self {
        Self {
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
            order: DetectionOrder::Input,
        }
    }
}

/// Outcome of counting one image.
///
/// `clusters` holds indices into the deduplicated detection list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CountReport {
    pub raw_detections: usize,
    pub unique_detections: usize,
    pub clusters: Vec<Vec<usize>>,
}

impl CountReport {
    pub fn individuals(&self) -> usize {
        self.clusters.len()
    }
}

/// Reduces one image's raw detections to its distinct individuals:
/// order, dedupe overlapping boxes, then cluster by descriptor distance.
pub struct CountIndividualsUseCase {
    clusterer: Box<dyn FaceClusterer>,
    config: CountConfig,
}

impl CountIndividualsUseCase {
    pub fn new(clusterer: Box<dyn FaceClusterer>, config: CountConfig) -> Self {
        Self { clusterer, config }
    }

    /// Single-linkage clustering at `config.distance_threshold`.
    pub fn from_config(config: CountConfig) -> Self {
        Self::new(
            Box::new(SingleLinkageClusterer::new(config.distance_threshold)),
            config,
        )
    }

    pub fn execute(&self, detections: &[Detection]) -> Result<CountReport, ClusteringError> {
        let raw_detections = detections.len();
        if raw_detections == 0 {
            return Ok(CountReport {
                raw_detections,
                unique_detections: 0,
                clusters: Vec::new(),
            });
        }

        let ordered = self.config.order.apply(detections);
        let unique = dedupe(&ordered, self.config.iou_threshold);
        log::info!("Filtered to {} unique detections", unique.len());

        let clusters = self.clusterer.cluster_indices(&unique)?;
        log::info!("→ {} unique individual(s)", clusters.len());

        Ok(CountReport {
            raw_detections,
            unique_detections: unique.len(),
            clusters,
        })
    }
}

/// Number of distinct individuals among `detections` at default thresholds.
pub fn count_individuals(detections: &[Detection]) -> Result<usize, ClusteringError> {
    CountIndividualsUseCase::from_config(CountConfig::default())
        .execute(detections)
        .map(|report| report.individuals())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::bounding_box::BoundingBox;
    use rstest::rstest;

    fn detection(x: f64, y: f64, w: f64, h: f64, descriptor: [f32; 3]) -> Detection {
        Detection::new(BoundingBox::new(x, y, w, h), descriptor.to_vec())
    }

    /// Five detections: 0 and 1 are the same box twice (IoU 0.9), 0/2/3 are
    /// one person within 0.5 of each other, 4 is at least 0.8 from everyone.
    fn five_detection_scene() -> Vec<Detection> {
        vec![
            detection(0.0, 0.0, 100.0, 100.0, [0.0, 0.0, 0.0]),
            detection(0.0, 0.0, 100.0, 90.0, [0.05, 0.0, 0.0]),
            detection(200.0, 0.0, 100.0, 100.0, [0.3, 0.0, 0.0]),
            detection(400.0, 0.0, 100.0, 100.0, [0.0, 0.3, 0.0]),
            detection(600.0, 0.0, 100.0, 100.0, [0.0, 0.0, 0.8]),
        ]
    }

    #[test]
    fn test_scene_counts_two_individuals() {
        let use_case = CountIndividualsUseCase::from_config(CountConfig::default());
        let report = use_case.execute(&five_detection_scene()).unwrap();

        assert_eq!(report.raw_detections, 5);
        assert_eq!(report.unique_detections, 4);
        assert_eq!(report.individuals(), 2);
        let mut sizes: Vec<usize> = report.clusters.iter().map(|c| c.len()).collect();
        sizes.sort();
        assert_eq!(sizes, vec![1, 3]);
        assert_eq!(report.clusters, vec![vec![0, 1, 2], vec![3]]);
    }

    #[test]
    fn test_count_individuals_matches_report() {
        assert_eq!(count_individuals(&five_detection_scene()).unwrap(), 2);
    }

    #[test]
    fn test_empty_input() {
        let report = CountIndividualsUseCase::from_config(CountConfig::default())
            .execute(&[])
            .unwrap();
        assert_eq!(report.raw_detections, 0);
        assert_eq!(report.unique_detections, 0);
        assert_eq!(report.individuals(), 0);
    }

    #[test]
    fn test_counts_never_increase_through_pipeline() {
        let scene = five_detection_scene();
        for threshold in [0.0, 0.2, 0.6, 1.0, 5.0] {
            let config = CountConfig {
                distance_threshold: threshold,
                ..CountConfig::default()
            };
            let report = CountIndividualsUseCase::from_config(config)
                .execute(&scene)
                .unwrap();
            assert!(report.individuals() <= report.unique_detections);
            assert!(report.unique_detections <= report.raw_detections);
        }
    }

    #[test]
    fn test_dimension_mismatch_surfaces() {
        let detections = vec![
            Detection::new(BoundingBox::new(0.0, 0.0, 10.0, 10.0), vec![0.0, 0.0]),
            Detection::new(BoundingBox::new(50.0, 0.0, 10.0, 10.0), vec![0.0]),
        ];
        assert!(count_individuals(&detections).is_err());
    }

    #[test]
    fn test_confidence_order_changes_dedup_survivor() {
        // Same box twice; the second is more confident and far in descriptor
        // space from the third detection, the first is close to it.
        let detections = vec![
            detection(0.0, 0.0, 50.0, 50.0, [0.0, 0.0, 0.0]).with_score(0.4),
            detection(0.0, 0.0, 50.0, 50.0, [5.0, 0.0, 0.0]).with_score(0.9),
            detection(100.0, 0.0, 50.0, 50.0, [0.1, 0.0, 0.0]).with_score(0.8),
        ];

        let by_input = CountIndividualsUseCase::from_config(CountConfig::default())
            .execute(&detections)
            .unwrap();
        let by_confidence = CountIndividualsUseCase::from_config(CountConfig {
            order: DetectionOrder::Confidence,
            ..CountConfig::default()
        })
        .execute(&detections)
        .unwrap();

        assert_eq!(by_input.individuals(), 1);
        assert_eq!(by_confidence.individuals(), 2);
    }

    #[test]
    fn test_custom_clusterer_is_used() {
        struct EverySingleton;
        impl FaceClusterer for EverySingleton {
            fn cluster_indices(
                &self,
                detections: &[Detection],
            ) -> Result<Vec<Vec<usize>>, ClusteringError> {
                Ok((0..detections.len()).map(|i| vec![i]).collect())
            }
        }

        let use_case = CountIndividualsUseCase::new(Box::new(EverySingleton), CountConfig::default());
        let report = use_case.execute(&five_detection_scene()).unwrap();
        assert_eq!(report.individuals(), 4);
    }

    #[test]
    fn test_default_config() {
        let config = CountConfig::default();
        assert_eq!(config.iou_threshold, 0.3);
        assert_eq!(config.distance_threshold, 0.6);
        assert_eq!(config.order, DetectionOrder::Input);
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case::iou_negative(-0.1, 0.6)]
    #[case::iou_above_one(1.5, 0.6)]
    #[case::iou_nan(f64::NAN, 0.6)]
    #[case::distance_negative(0.3, -1.0)]
    #[case::distance_nan(0.3, f64::NAN)]
    #[case::distance_infinite(0.3, f64::INFINITY)]
    fn test_invalid_config_rejected(#[case] iou: f64, #[case] distance: f64) {
        let config = CountConfig {
            iou_threshold: iou,
            distance_threshold: distance,
            order: DetectionOrder::Input,
        };
        assert!(config.validate().is_err());
    }
}
