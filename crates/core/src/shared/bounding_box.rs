use serde::{Deserialize, Serialize};

/// Axis-aligned face bounding box in image pixel coordinates.
///
/// Boxes coming from an upstream detector are not trusted: a box with a
/// non-positive side, a negative origin or a non-finite value is degenerate
/// and overlaps nothing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_valid(&self) -> bool {
        let finite = self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite();
        finite && self.x >= 0.0 && self.y >= 0.0 && self.width > 0.0 && self.height > 0.0
    }

    pub fn area(&self) -> f64 {
        if self.is_valid() {
            self.width * self.height
        } else {
            0.0
        }
    }

    /// Intersection over union with `other`, in `[0, 1]`.
    ///
    /// Returns 0 when the boxes do not overlap or either box is degenerate.
    pub fn iou(&self, other: &BoundingBox) -> f64 {
        if !self.is_valid() || !other.is_valid() {
            return 0.0;
        }

        let ix1 = self.x.max(other.x);
        let iy1 = self.y.max(other.y);
        let ix2 = (self.x + self.width).min(other.x + other.width);
        let iy2 = (self.y + self.height).min(other.y + other.height);

        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        if inter == 0.0 {
            return 0.0;
        }

        inter / (self.area() + other.area() - inter)
    }
}
