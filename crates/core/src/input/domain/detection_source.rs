use std::path::Path;

use crate::shared::detection::ImageDetections;

/// Supplies per-image detections produced by an upstream face detector.
///
/// Implementations decide how a path maps to images (one file, a batch file,
/// a directory). Images must come back in a stable order.
pub trait DetectionSource: Send {
    fn load(&self, path: &Path) -> Result<Vec<ImageDetections>, Box<dyn std::error::Error>>;
}
