use crate::shared::detection::Detection;

/// Greedy first-wins suppression of overlapping detections.
///
/// Walks detections in input order; a detection is kept only if its box IoU
/// with every previously kept detection is at or below `iou_threshold`.
/// Suppressed detections are never compared again, so the result depends on
/// input order and callers must pass a stable one (scan order, or descending
/// confidence via [`DetectionOrder`](super::detection_order::DetectionOrder)).
///
/// The output is an order-preserving subsequence of the input.
pub fn dedupe(detections: &[Detection], iou_threshold: f64) -> Vec<Detection> {
    if detections.len() <= 1 {
        return detections.to_vec();
    }
    let mut kept: Vec<Detection> = Vec::with_capacity(detections.len());
    for d in detections {
        let duplicate = kept.iter().any(|k| k.bbox.iou(&d.bbox) > iou_threshold);
        if !duplicate {
            kept.push(d.clone());
        }
    }
    kept
}
