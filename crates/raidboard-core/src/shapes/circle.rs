//! Radius marker (area-of-effect circle).

use super::ShapeId;
use crate::geometry::distance;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A circle around `center`. Backs both the committed marker and its preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub(crate) id: ShapeId,
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            center,
            radius,
        }
    }

    /// Circle centered on `center` passing through `edge` (radius rounded).
    pub fn through(center: Point, edge: Point) -> Self {
        Self::new(center, distance(center, edge))
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_through() {
        let circle = Circle::through(Point::new(100.0, 100.0), Point::new(150.0, 100.0));
        assert_eq!(circle.center, Point::new(100.0, 100.0));
        assert_eq!(circle.radius, 50.0);
    }
}
