//! Movement arrow.

use super::ShapeId;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A straight arrow from `start` to `end` (the head sits at `end`).
///
/// The same geometry backs both the committed arrow and its live preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub(crate) id: ShapeId,
    /// Start point.
    pub start: Point,
    /// End point (where the arrowhead points).
    pub end: Point,
}

impl Arrow {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// Endpoints flattened to `[x0, y0, x1, y1]`.
    pub fn points(&self) -> [f64; 4] {
        [self.start.x, self.start.y, self.end.x, self.end.y]
    }

    /// Length of the shaft.
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }
}
