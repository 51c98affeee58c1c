use serde::{Deserialize, Serialize};

use crate::shared::bounding_box::BoundingBox;

/// One face found by the upstream detector.
///
/// `descriptor` is the identity embedding; every detection compared in one
/// clustering run must share the same descriptor length.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
    pub descriptor: Vec<f32>,
    /// Detector confidence, when the upstream model reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Detection {
    pub fn new(bbox: BoundingBox, descriptor: Vec<f32>) -> Self {
        Self {
            bbox,
            descriptor,
            score: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}

/// The detections belonging to a single image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageDetections {
    pub name: String,
    pub detections: Vec<Detection>,
}

impl ImageDetections {
    pub fn new(name: impl Into<String>, detections: Vec<Detection>) -> Self {
        Self {
            name: name.into(),
            detections,
        }
    }
}
