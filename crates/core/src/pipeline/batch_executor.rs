use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::pipeline::count_individuals_use_case::{CountConfig, CountIndividualsUseCase, CountReport};
use crate::shared::detection::ImageDetections;

/// Progress callback: `(images_done, total_images)`. Returning `false`
/// cancels the batch.
pub type BatchProgressFn<'a> = dyn FnMut(usize, usize) -> bool + 'a;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ImageOutcome {
    Counted(CountReport),
    Failed { error: String },
}

/// Result for one image of a batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageCount {
    pub name: String,
    pub outcome: ImageOutcome,
    pub elapsed_ms: f64,
}

impl ImageCount {
    /// Individuals found, or 0 when the image failed.
    pub fn individuals(&self) -> usize {
        match &self.outcome {
            ImageOutcome::Counted(report) => report.individuals(),
            ImageOutcome::Failed { .. } => 0,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, ImageOutcome::Failed { .. })
    }
}

/// Abstracts how a batch of images is counted.
///
/// Every image is independent, so implementations are free to spread them
/// over threads. Results must come back in input order, one per image, and a
/// failing image must not abort the rest of the batch.
pub trait BatchExecutor: Send {
    fn execute(
        &self,
        images: Vec<ImageDetections>,
        config: CountConfig,
        on_progress: &mut BatchProgressFn<'_>,
    ) -> Result<Vec<ImageCount>, Box<dyn std::error::Error>>;
}

/// Counts a single image, capturing clustering errors in the outcome.
pub fn count_image(image: &ImageDetections, config: CountConfig) -> ImageCount {
    let start = Instant::now();
    let outcome = match CountIndividualsUseCase::from_config(config).execute(&image.detections) {
        Ok(report) => ImageOutcome::Counted(report),
        Err(e) => {
            log::warn!("{}: {e}", image.name);
            ImageOutcome::Failed {
                error: e.to_string(),
            }
        }
    };
    ImageCount {
        name: image.name.clone(),
        outcome,
        elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::bounding_box::BoundingBox;
    use crate::shared::detection::Detection;

    fn image(name: &str, descriptors: &[Vec<f32>]) -> ImageDetections {
        let detections = descriptors
            .iter()
            .enumerate()
            .map(|(i, d)| {
                Detection::new(BoundingBox::new(i as f64 * 100.0, 0.0, 50.0, 50.0), d.clone())
            })
            .collect();
        ImageDetections::new(name, detections)
    }

    #[test]
    fn test_count_image_success() {
        let img = image("a.jpg", &[vec![0.0, 0.0], vec![0.1, 0.0], vec![3.0, 3.0]]);
        let count = count_image(&img, CountConfig::default());
        assert_eq!(count.name, "a.jpg");
        assert_eq!(count.individuals(), 2);
        assert!(!count.is_failed());
        assert!(count.elapsed_ms >= 0.0);
    }

    #[test]
    fn test_count_image_failure_counts_zero() {
        let img = image("bad.jpg", &[vec![0.0, 0.0], vec![0.1]]);
        let count = count_image(&img, CountConfig::default());
        assert!(count.is_failed());
        assert_eq!(count.individuals(), 0);
        match &count.outcome {
            ImageOutcome::Failed { error } => assert!(error.contains("dimension mismatch")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let img = image("a.jpg", &[vec![0.0]]);
        let json = serde_json::to_value(count_image(&img, CountConfig::default())).unwrap();
        assert_eq!(json["outcome"]["status"], "counted");
        assert_eq!(json["outcome"]["unique_detections"], 1);
    }
}
