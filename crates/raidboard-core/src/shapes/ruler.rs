//! Distance ruler.

use super::ShapeId;
use crate::geometry::{distance, format_distance};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A measuring line between two points. At most one exists at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ruler {
    pub(crate) id: ShapeId,
    pub start: Point,
    pub end: Point,
}

impl Ruler {
    /// A zero-length ruler anchored at `start`.
    pub fn new(start: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end: start,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// Rounded length in pixels.
    pub fn length(&self) -> f64 {
        distance(self.start, self.end)
    }

    /// Text shown next to the ruler's end, e.g. `"5 px"`.
    pub fn label(&self) -> String {
        format_distance(self.length())
    }
}
