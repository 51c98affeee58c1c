use crate::pipeline::batch_executor::{count_image, BatchExecutor, BatchProgressFn, ImageCount};
use crate::pipeline::count_individuals_use_case::CountConfig;
use crate::shared::detection::ImageDetections;

/// Counts images one after another on the calling thread.
pub struct SequentialBatchExecutor;

impl BatchExecutor for SequentialBatchExecutor {
    fn execute(
        &self,
        images: Vec<ImageDetections>,
        config: CountConfig,
        on_progress: &mut BatchProgressFn<'_>,
    ) -> Result<Vec<ImageCount>, Box<dyn std::error::Error>> {
        let total = images.len();
        let mut results = Vec::with_capacity(total);
        for image in &images {
            log::info!("Processing: {}", image.name);
            results.push(count_image(image, config));
            if !on_progress(results.len(), total) {
                return Err("Cancelled".into());
            }
        }
        Ok(results)
    }
}
