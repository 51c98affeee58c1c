use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::input::domain::detection_source::DetectionSource;
use crate::pipeline::batch_executor::{BatchExecutor, ImageCount, ImageOutcome};
use crate::pipeline::count_individuals_use_case::CountConfig;
use crate::pipeline::pipeline_logger::PipelineLogger;

/// Per-image counts for a batch, plus totals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub images: Vec<ImageCount>,
    pub total_individuals: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_counts(images: Vec<ImageCount>) -> Self {
        let total_individuals = images.iter().map(ImageCount::individuals).sum();
        let failed = images.iter().filter(|c| c.is_failed()).count();
        Self {
            images,
            total_individuals,
            failed,
        }
    }
}

/// Loads detections for a set of images and counts the individuals in each.
///
/// Images are counted independently; identities are never matched across
/// images, so the total is a plain sum.
pub struct CountImagesUseCase {
    source: Box<dyn DetectionSource>,
    executor: Box<dyn BatchExecutor>,
    logger: Box<dyn PipelineLogger>,
    config: CountConfig,
    on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
}

impl CountImagesUseCase {
    pub fn new(
        source: Box<dyn DetectionSource>,
        executor: Box<dyn BatchExecutor>,
        logger: Box<dyn PipelineLogger>,
        config: CountConfig,
        on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    ) -> Self {
        Self {
            source,
            executor,
            logger,
            config,
            on_progress,
        }
    }

    pub fn execute(&mut self, input: &Path) -> Result<BatchSummary, Box<dyn std::error::Error>> {
        self.config.validate()?;

        let images = self.source.load(input)?;
        if images.is_empty() {
            self.logger.info("No images found in input.");
            return Ok(BatchSummary::from_counts(Vec::new()));
        }
        self.logger.info(&format!("Found {} image(s)", images.len()));

        let logger = &mut self.logger;
        let on_progress = &self.on_progress;
        let counts = self.executor.execute(images, self.config, &mut |current, total| {
            logger.progress(current, total);
            on_progress.as_ref().map_or(true, |callback| callback(current, total))
        })?;

        for count in &counts {
            self.record(count);
        }

        let summary = BatchSummary::from_counts(counts);
        self.logger.metric("failed_images", summary.failed as f64);
        self.logger.summary();
        Ok(summary)
    }

    fn record(&mut self, count: &ImageCount) {
        self.logger.timing("count", count.elapsed_ms);
        match &count.outcome {
            ImageOutcome::Counted(report) => {
                self.logger.metric("raw_detections", report.raw_detections as f64);
                self.logger
                    .metric("unique_detections", report.unique_detections as f64);
                self.logger.metric("individuals", report.individuals() as f64);
            }
            ImageOutcome::Failed { error } => {
                self.logger.info(&format!("{}: {error}", count.name));
            }
        }
    }
}
