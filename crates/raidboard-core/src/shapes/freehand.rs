//! Freehand ink line.

use super::ShapeId;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A freehand line (series of points), append-only while drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreehandLine {
    pub(crate) id: ShapeId,
    /// Points in drawing order.
    pub points: Vec<Point>,
    /// Curve tension hint for renderers that smooth the polyline.
    pub tension: f64,
}

impl FreehandLine {
    pub const DEFAULT_TENSION: f64 = 0.4;

    /// Start a new line at `start`.
    pub fn new(start: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            points: vec![start],
            tension: Self::DEFAULT_TENSION,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// Add a point to the end of the line.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
