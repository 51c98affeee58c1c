use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::shared::detection::Detection;

/// Order in which detections are fed to the deduplicator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionOrder {
    /// Keep the order the detector produced.
    #[default]
    Input,
    /// Highest confidence first, so the strongest detection of a face wins.
    Confidence,
}

impl DetectionOrder {
    /// Returns the detections in this order.
    ///
    /// The confidence sort is stable. Detections without a usable score
    /// (missing or NaN) go after all scored ones.
    pub fn apply(&self, detections: &[Detection]) -> Vec<Detection> {
        let mut ordered = detections.to_vec();
        if *self == DetectionOrder::Confidence {
            ordered.sort_by(|a, b| compare_scores_desc(a.score, b.score));
        }
        ordered
    }
}

impl std::fmt::Display for DetectionOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionOrder::Input => write!(f, "input"),
            DetectionOrder::Confidence => write!(f, "confidence"),
        }
    }
}

impl std::str::FromStr for DetectionOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input" => Ok(DetectionOrder::Input),
            "confidence" => Ok(DetectionOrder::Confidence),
            other => Err(format!(
                "Order must be 'input' or 'confidence', got '{other}'"
            )),
        }
    }
}

fn compare_scores_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    let a = a.filter(|s| !s.is_nan());
    let b = b.filter(|s| !s.is_nan());
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
