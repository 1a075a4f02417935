//! Bounding box geometry

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in pixel coordinates, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn xmax(&self) -> f32 {
        self.x + self.width
    }

    pub fn ymax(&self) -> f32 {
        self.y + self.height
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    pub fn intersection_area(&self, other: &BoundingBox) -> f32 {
        let left = self.x.max(other.x);
        let right = self.xmax().min(other.xmax());
        let top = self.y.max(other.y);
        let bottom = self.ymax().min(other.ymax());
        (right - left).max(0.0) * (bottom - top).max(0.0)
    }

    /// Intersection over union. Returns 0.0 for degenerate or
    /// non-finite inputs instead of propagating NaN.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        if !self.is_valid() || !other.is_valid() {
            return 0.0;
        }
        let intersection = self.intersection_area(other);
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 || !union.is_finite() {
            return 0.0;
        }
        let iou = intersection / union;
        if iou.is_finite() {
            iou.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Clip the box to a `frame_width` x `frame_height` frame.
    /// Returns `None` when nothing of the box lies inside the frame.
    pub fn clamp_to_frame(&self, frame_width: f32, frame_height: f32) -> Option<BoundingBox> {
        if !self.is_valid() || frame_width <= 0.0 || frame_height <= 0.0 {
            return None;
        }
        let x = self.x.max(0.0);
        let y = self.y.max(0.0);
        let width = self.xmax().min(frame_width) - x;
        let height = self.ymax().min(frame_height) - y;
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        Some(BoundingBox::new(x, y, width, height))
    }
}
