//! Drawable overlay shapes.

mod arrow;
mod circle;
mod freehand;
mod ping;
mod ruler;

pub use arrow::Arrow;
pub use circle::Circle;
pub use freehand::FreehandLine;
pub use ping::Ping;
pub use ruler::Ruler;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Discriminant of [`Shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    FreehandLine,
    Arrow,
    ArrowPreview,
    Ping,
    DistanceRuler,
    CircleMarker,
    CirclePreview,
}

impl ShapeKind {
    /// Kinds of which at most one instance may exist at a time.
    ///
    /// These live in dedicated slots of the scene rather than in the shape list.
    pub fn is_singleton(self) -> bool {
        matches!(
            self,
            ShapeKind::ArrowPreview | ShapeKind::CirclePreview | ShapeKind::DistanceRuler
        )
    }

    /// Ephemeral shape shown only while a gesture is in progress.
    pub fn is_preview(self) -> bool {
        matches!(self, ShapeKind::ArrowPreview | ShapeKind::CirclePreview)
    }

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::FreehandLine => "freehand-line",
            ShapeKind::Arrow => "arrow",
            ShapeKind::ArrowPreview => "arrow-preview",
            ShapeKind::Ping => "ping",
            ShapeKind::DistanceRuler => "distance-ruler",
            ShapeKind::CircleMarker => "circle-marker",
            ShapeKind::CirclePreview => "circle-preview",
        }
    }
}

/// Every drawable object on the board, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Shape {
    FreehandLine(FreehandLine),
    Arrow(Arrow),
    ArrowPreview(Arrow),
    Ping(Ping),
    DistanceRuler(Ruler),
    CircleMarker(Circle),
    CirclePreview(Circle),
}

impl Shape {
    pub fn id(&self) -> ShapeId {
        match self {
            Shape::FreehandLine(s) => s.id(),
            Shape::Arrow(s) | Shape::ArrowPreview(s) => s.id(),
            Shape::Ping(s) => s.id(),
            Shape::DistanceRuler(s) => s.id(),
            Shape::CircleMarker(s) | Shape::CirclePreview(s) => s.id(),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::FreehandLine(_) => ShapeKind::FreehandLine,
            Shape::Arrow(_) => ShapeKind::Arrow,
            Shape::ArrowPreview(_) => ShapeKind::ArrowPreview,
            Shape::Ping(_) => ShapeKind::Ping,
            Shape::DistanceRuler(_) => ShapeKind::DistanceRuler,
            Shape::CircleMarker(_) => ShapeKind::CircleMarker,
            Shape::CirclePreview(_) => ShapeKind::CirclePreview,
        }
    }

    pub fn as_freehand_mut(&mut self) -> Option<&mut FreehandLine> {
        match self {
            Shape::FreehandLine(line) => Some(line),
            _ => None,
        }
    }

    /// Circle geometry of a marker or preview.
    pub fn as_circle_mut(&mut self) -> Option<&mut Circle> {
        match self {
            Shape::CircleMarker(c) | Shape::CirclePreview(c) => Some(c),
            _ => None,
        }
    }

    /// Arrow geometry of an arrow or preview.
    pub fn as_arrow_mut(&mut self) -> Option<&mut Arrow> {
        match self {
            Shape::Arrow(a) | Shape::ArrowPreview(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_ruler_mut(&mut self) -> Option<&mut Ruler> {
        match self {
            Shape::DistanceRuler(r) => Some(r),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Timestamp;
    use kurbo::Point;

    #[test]
    fn test_kind_matches_variant() {
        let arrow = Arrow::new(Point::ZERO, Point::new(1.0, 1.0));
        assert_eq!(Shape::Arrow(arrow.clone()).kind(), ShapeKind::Arrow);
        assert_eq!(Shape::ArrowPreview(arrow).kind(), ShapeKind::ArrowPreview);
        let ping = Ping::new(Point::ZERO, Timestamp::ZERO);
        assert_eq!(Shape::Ping(ping.clone()).id(), ping.id());
    }

    #[test]
    fn test_singleton_kinds() {
        assert!(ShapeKind::ArrowPreview.is_singleton());
        assert!(ShapeKind::CirclePreview.is_singleton());
        assert!(ShapeKind::DistanceRuler.is_singleton());
        assert!(!ShapeKind::Arrow.is_singleton());
        assert!(!ShapeKind::DistanceRuler.is_preview());
    }

    #[test]
    fn test_serialized_tag_uses_kind_name() {
        let shape = Shape::CircleMarker(Circle::new(Point::new(1.0, 2.0), 3.0));
        let value = serde_json::to_value(&shape).unwrap();
        assert_eq!(value["kind"], ShapeKind::CircleMarker.name());
        assert_eq!(value["radius"], 3.0);
    }
}
