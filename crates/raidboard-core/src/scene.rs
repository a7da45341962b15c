//! Scene store: the authoritative tokens and drawable shapes.
//!
//! Persistent shapes and pings live in an ordered list. The kinds of which at
//! most one may exist (arrow preview, circle preview, distance ruler) each get
//! their own slot, so replacing one can never leave a stale copy behind.
//!
//! No operation here fails: an id that is no longer present is a no-op, since
//! timers and fast input routinely race with removals.

use crate::clock::Timestamp;
use crate::color::TokenColor;
use crate::expiry::{ExpiryQueue, PendingExpiry};
use crate::shapes::{Arrow, Circle, Ruler, Shape, ShapeId, ShapeKind};
use crate::token::{Token, TokenId};
use kurbo::Point;
use rand::Rng;
use std::time::Duration;

/// In-place edit applied by [`Scene::update_shape`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapePatch {
    /// Append a point to a freehand line.
    AppendPoint(Point),
    /// Move the end of an arrow, arrow preview or ruler.
    SetEnd(Point),
    /// Resize a circle marker or preview.
    SetRadius(f64),
}

impl ShapePatch {
    /// Apply to `shape`. Returns false if the patch does not fit the shape's kind.
    fn apply(self, shape: &mut Shape) -> bool {
        match self {
            ShapePatch::AppendPoint(p) => shape.as_freehand_mut().map(|line| line.add_point(p)).is_some(),
            ShapePatch::SetEnd(p) => {
                if let Some(arrow) = shape.as_arrow_mut() {
                    arrow.end = p;
                    true
                } else if let Some(ruler) = shape.as_ruler_mut() {
                    ruler.end = p;
                    true
                } else {
                    false
                }
            }
            ShapePatch::SetRadius(r) => shape.as_circle_mut().map(|c| c.radius = r).is_some(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// Tokens in creation order (later tokens draw on top).
    tokens: Vec<Token>,
    /// Non-singleton shapes in creation order.
    shapes: Vec<Shape>,
    /// Holds only `Shape::ArrowPreview`.
    arrow_preview: Option<Shape>,
    /// Holds only `Shape::CirclePreview`.
    circle_preview: Option<Shape>,
    /// Holds only `Shape::DistanceRuler`.
    ruler: Option<Shape>,
    /// Pending automatic removals.
    expiries: ExpiryQueue,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Tokens -----------------------------------------------------------

    /// Add a token near `center`, offset by up to `jitter` on each axis so
    /// repeated adds don't stack exactly.
    pub fn add_token(
        &mut self,
        label: impl Into<String>,
        color: TokenColor,
        center: Point,
        jitter: f64,
    ) -> Token {
        let position = if jitter > 0.0 {
            let mut rng = rand::rng();
            Point::new(
                center.x + rng.random_range(-jitter..=jitter),
                center.y + rng.random_range(-jitter..=jitter),
            )
        } else {
            center
        };
        let token = Token::new(position, label, color);
        log::debug!("Added token {} ({}) at {:?}", token.id(), token.label(), position);
        self.tokens.push(token.clone());
        token
    }

    pub fn set_token_position(&mut self, id: TokenId, position: Point) {
        if let Some(token) = self.token_mut(id) {
            token.position = position;
        }
    }

    /// Advance a token's aura through 0 -> 100 -> 150 -> 0.
    pub fn cycle_token_radius(&mut self, id: TokenId) {
        if let Some(token) = self.token_mut(id) {
            token.cycle_radius();
        }
    }

    /// Add `delta` to a token's aura, floored at 0.
    pub fn adjust_token_radius(&mut self, id: TokenId, delta: f64) {
        if let Some(token) = self.token_mut(id) {
            token.adjust_radius(delta);
        }
    }

    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.tokens.iter().find(|t| t.id == id)
    }

    fn token_mut(&mut self, id: TokenId) -> Option<&mut Token> {
        self.tokens.iter_mut().find(|t| t.id == id)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Topmost token whose marker disk contains `point`.
    pub fn token_at(&self, point: Point, marker_radius: f64) -> Option<TokenId> {
        self.tokens
            .iter()
            .rev()
            .find(|t| t.contains(point, marker_radius))
            .map(|t| t.id)
    }

    // --- Shapes -----------------------------------------------------------

    fn slot_mut(&mut self, kind: ShapeKind) -> Option<&mut Option<Shape>> {
        match kind {
            ShapeKind::ArrowPreview => Some(&mut self.arrow_preview),
            ShapeKind::CirclePreview => Some(&mut self.circle_preview),
            ShapeKind::DistanceRuler => Some(&mut self.ruler),
            _ => None,
        }
    }

    /// Add a shape. Singleton kinds replace the current occupant of their slot.
    pub fn append_shape(&mut self, shape: Shape) {
        let kind = shape.kind();
        if kind.is_singleton() {
            self.replace_shapes_of_kind(kind, Some(shape));
        } else {
            self.shapes.push(shape);
        }
    }

    /// Apply `patch` to the shape with `id`. Returns false if the id is gone or
    /// the patch does not fit the shape.
    pub fn update_shape(&mut self, id: ShapeId, patch: ShapePatch) -> bool {
        let shape = self
            .shapes
            .iter_mut()
            .chain(self.arrow_preview.iter_mut())
            .chain(self.circle_preview.iter_mut())
            .chain(self.ruler.iter_mut())
            .find(|s| s.id() == id);
        match shape {
            Some(shape) => patch.apply(shape),
            None => false,
        }
    }

    /// Remove a shape and cancel its pending expiry.
    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        self.expiries.cancel(id);
        if let Some(index) = self.shapes.iter().position(|s| s.id() == id) {
            return Some(self.shapes.remove(index));
        }
        for slot in [&mut self.arrow_preview, &mut self.circle_preview, &mut self.ruler] {
            if slot.as_ref().is_some_and(|s| s.id() == id) {
                return slot.take();
            }
        }
        None
    }

    /// Remove every shape of `kind`, then insert `replacement` if given.
    ///
    /// A replacement of a different kind is refused and nothing changes.
    pub fn replace_shapes_of_kind(&mut self, kind: ShapeKind, replacement: Option<Shape>) {
        if let Some(shape) = &replacement {
            if shape.kind() != kind {
                log::warn!(
                    "Refusing to replace {} shapes with a {}",
                    kind.name(),
                    shape.kind().name()
                );
                return;
            }
        }

        let mut removed = Vec::new();
        if let Some(slot) = self.slot_mut(kind) {
            removed.extend(slot.take().map(|s| s.id()));
            *slot = replacement;
        } else {
            self.shapes.retain(|s| {
                if s.kind() == kind {
                    removed.push(s.id());
                    false
                } else {
                    true
                }
            });
            self.shapes.extend(replacement);
        }
        for id in removed {
            self.expiries.cancel(id);
        }
    }

    /// Remove the shape with `id` once `delay` has passed after `now`.
    ///
    /// Does nothing if the shape is already gone.
    pub fn schedule_expiry(&mut self, id: ShapeId, delay: Duration, now: Timestamp) {
        if self.contains_shape(id) {
            self.expiries.schedule(id, now, delay);
        }
    }

    /// Remove every shape whose expiry is due at `now`. Returns the removed ids.
    pub fn run_expiries(&mut self, now: Timestamp) -> Vec<ShapeId> {
        let due = self.expiries.take_due(now);
        due.into_iter()
            .filter(|&id| self.remove_shape(id).is_some())
            .inspect(|id| log::debug!("Shape {id} expired"))
            .collect()
    }

    pub fn pending_expiries(&self) -> impl Iterator<Item = &PendingExpiry> {
        self.expiries.iter()
    }

    /// Earliest pending expiry deadline.
    pub fn next_expiry(&self) -> Option<Timestamp> {
        self.expiries.next_due()
    }

    /// Empty tokens, shapes and the ruler, and drop all pending timers.
    pub fn clear_all(&mut self) {
        self.tokens.clear();
        self.shapes.clear();
        self.arrow_preview = None;
        self.circle_preview = None;
        self.ruler = None;
        self.expiries.clear();
    }

    pub fn contains_shape(&self, id: ShapeId) -> bool {
        self.shape(id).is_some()
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.drawables().chain(self.ruler.iter()).find(|s| s.id() == id)
    }

    /// Non-singleton shapes in creation order.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Shapes in draw order: the list, then the previews. The ruler is drawn
    /// separately, above tokens.
    pub fn drawables(&self) -> impl Iterator<Item = &Shape> {
        self.shapes
            .iter()
            .chain(self.arrow_preview.iter())
            .chain(self.circle_preview.iter())
    }

    /// Number of shapes of `kind` currently present.
    pub fn count_of_kind(&self, kind: ShapeKind) -> usize {
        self.drawables()
            .chain(self.ruler.iter())
            .filter(|s| s.kind() == kind)
            .count()
    }

    pub fn arrow_preview(&self) -> Option<&Arrow> {
        match &self.arrow_preview {
            Some(Shape::ArrowPreview(a)) => Some(a),
            _ => None,
        }
    }

    pub fn circle_preview(&self) -> Option<&Circle> {
        match &self.circle_preview {
            Some(Shape::CirclePreview(c)) => Some(c),
            _ => None,
        }
    }

    pub fn ruler(&self) -> Option<&Ruler> {
        match &self.ruler {
            Some(Shape::DistanceRuler(r)) => Some(r),
            _ => None,
        }
    }

    /// True when the board holds nothing at all.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
            && self.shapes.is_empty()
            && self.arrow_preview.is_none()
            && self.circle_preview.is_none()
            && self.ruler.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{FreehandLine, Ping};
    use std::collections::HashSet;

    fn red() -> TokenColor {
        TokenColor::rgb(255, 0, 0)
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_add_tokens_unique_ids_zero_radius() {
        let mut scene = Scene::new();
        for i in 0..50 {
            scene.add_token(format!("T{i}"), red(), Point::new(550.0, 340.0), 20.0);
        }
        let ids: HashSet<_> = scene.tokens().iter().map(|t| t.id()).collect();
        assert_eq!(ids.len(), 50);
        assert!(scene.tokens().iter().all(|t| t.radius == 0.0 && !t.locked));
    }

    #[test]
    fn test_add_token_jitter_bounds() {
        let mut scene = Scene::new();
        let center = Point::new(550.0, 340.0);
        for _ in 0..100 {
            let t = scene.add_token("A", red(), center, 20.0);
            assert!((t.position.x - center.x).abs() <= 20.0);
            assert!((t.position.y - center.y).abs() <= 20.0);
        }
        let exact = scene.add_token("B", red(), center, 0.0);
        assert_eq!(exact.position, center);
    }

    #[test]
    fn test_token_operations_on_missing_id_are_noops() {
        let mut scene = Scene::new();
        let t = scene.add_token("A", red(), Point::ZERO, 0.0);
        let ghost = uuid::Uuid::new_v4();

        scene.set_token_position(ghost, Point::new(1.0, 1.0));
        scene.cycle_token_radius(ghost);
        scene.adjust_token_radius(ghost, 10.0);

        assert_eq!(scene.token(t.id()), Some(&t));
    }

    #[test]
    fn test_cycle_token_radius_three_times_is_identity() {
        let mut scene = Scene::new();
        let id = scene.add_token("A", red(), Point::ZERO, 0.0).id();
        for start in [0.0, 100.0, 150.0] {
            while scene.token(id).unwrap().radius != start {
                scene.cycle_token_radius(id);
            }
            for _ in 0..3 {
                scene.cycle_token_radius(id);
            }
            assert_eq!(scene.token(id).unwrap().radius, start);
        }
    }

    #[test]
    fn test_adjust_token_radius_never_negative() {
        let mut scene = Scene::new();
        let id = scene.add_token("A", red(), Point::ZERO, 0.0).id();
        for delta in [-5.0, 20.0, -3.0, -1e9, 7.5, -7.5, -0.1] {
            scene.adjust_token_radius(id, delta);
            assert!(scene.token(id).unwrap().radius >= 0.0);
        }
    }

    #[test]
    fn test_set_token_position() {
        let mut scene = Scene::new();
        let id = scene.add_token("A", red(), Point::ZERO, 0.0).id();
        scene.set_token_position(id, Point::new(12.0, -3.0));
        assert_eq!(scene.token(id).unwrap().position, Point::new(12.0, -3.0));
    }

    #[test]
    fn test_token_at_prefers_topmost() {
        let mut scene = Scene::new();
        let below = scene.add_token("A", red(), Point::new(100.0, 100.0), 0.0).id();
        let above = scene.add_token("B", red(), Point::new(110.0, 100.0), 0.0).id();

        assert_eq!(scene.token_at(Point::new(105.0, 100.0), 18.0), Some(above));
        assert_eq!(scene.token_at(Point::new(85.0, 100.0), 18.0), Some(below));
        assert_eq!(scene.token_at(Point::new(300.0, 300.0), 18.0), None);
    }

    #[test]
    fn test_singleton_append_replaces() {
        let mut scene = Scene::new();
        scene.append_shape(Shape::CirclePreview(Circle::new(Point::ZERO, 0.0)));
        let second = Circle::new(Point::new(5.0, 5.0), 0.0);
        scene.append_shape(Shape::CirclePreview(second.clone()));

        assert_eq!(scene.count_of_kind(ShapeKind::CirclePreview), 1);
        assert_eq!(scene.circle_preview(), Some(&second));
    }

    #[test]
    fn test_replace_list_kind() {
        let mut scene = Scene::new();
        scene.append_shape(Shape::Arrow(Arrow::new(Point::ZERO, Point::new(1.0, 0.0))));
        scene.append_shape(Shape::Arrow(Arrow::new(Point::ZERO, Point::new(2.0, 0.0))));
        scene.append_shape(Shape::FreehandLine(FreehandLine::new(Point::ZERO)));

        scene.replace_shapes_of_kind(ShapeKind::Arrow, None);
        assert_eq!(scene.count_of_kind(ShapeKind::Arrow), 0);
        assert_eq!(scene.count_of_kind(ShapeKind::FreehandLine), 1);
    }

    #[test]
    fn test_replace_refuses_mismatched_kind() {
        let mut scene = Scene::new();
        let preview = Arrow::new(Point::ZERO, Point::new(1.0, 1.0));
        scene.append_shape(Shape::ArrowPreview(preview.clone()));

        scene.replace_shapes_of_kind(
            ShapeKind::ArrowPreview,
            Some(Shape::Arrow(Arrow::new(Point::ZERO, Point::ZERO))),
        );
        assert_eq!(scene.arrow_preview(), Some(&preview));
        assert!(scene.shapes().is_empty());
    }

    #[test]
    fn test_update_shape_patches() {
        let mut scene = Scene::new();
        let line = FreehandLine::new(Point::ZERO);
        let line_id = line.id();
        scene.append_shape(Shape::FreehandLine(line));
        let ruler = Ruler::new(Point::ZERO);
        let ruler_id = ruler.id();
        scene.append_shape(Shape::DistanceRuler(ruler));

        assert!(scene.update_shape(line_id, ShapePatch::AppendPoint(Point::new(1.0, 1.0))));
        assert!(scene.update_shape(ruler_id, ShapePatch::SetEnd(Point::new(3.0, 4.0))));
        assert!(!scene.update_shape(line_id, ShapePatch::SetRadius(3.0)));
        assert!(!scene.update_shape(uuid::Uuid::new_v4(), ShapePatch::SetRadius(3.0)));

        assert_eq!(scene.ruler().unwrap().label(), "5 px");
        match scene.shape(line_id) {
            Some(Shape::FreehandLine(l)) => assert_eq!(l.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_remove_shape_from_slot_and_list() {
        let mut scene = Scene::new();
        let ping = Ping::new(Point::ZERO, Timestamp::ZERO);
        let ping_id = ping.id();
        scene.append_shape(Shape::Ping(ping));
        let ruler = Ruler::new(Point::ZERO);
        let ruler_id = ruler.id();
        scene.append_shape(Shape::DistanceRuler(ruler));

        assert!(scene.remove_shape(ping_id).is_some());
        assert!(scene.remove_shape(ruler_id).is_some());
        assert!(scene.remove_shape(ruler_id).is_none());
        assert!(scene.is_empty());
    }

    #[test]
    fn test_expiry_removes_shape() {
        let mut scene = Scene::new();
        let ping = Ping::new(Point::new(10.0, 10.0), Timestamp::ZERO);
        let id = ping.id();
        scene.append_shape(Shape::Ping(ping));
        scene.schedule_expiry(id, ms(900), Timestamp::ZERO);

        assert!(scene.run_expiries(Timestamp::from_millis(899)).is_empty());
        assert!(scene.contains_shape(id));
        assert_eq!(scene.run_expiries(Timestamp::from_millis(900)), vec![id]);
        assert!(!scene.contains_shape(id));
    }

    #[test]
    fn test_schedule_expiry_for_missing_shape_is_noop() {
        let mut scene = Scene::new();
        scene.schedule_expiry(uuid::Uuid::new_v4(), ms(10), Timestamp::ZERO);
        assert_eq!(scene.pending_expiries().count(), 0);
    }

    #[test]
    fn test_clear_all_invalidates_timers() {
        let mut scene = Scene::new();
        scene.add_token("A", red(), Point::ZERO, 0.0);
        let ping = Ping::new(Point::ZERO, Timestamp::ZERO);
        let ping_id = ping.id();
        scene.append_shape(Shape::Ping(ping));
        scene.schedule_expiry(ping_id, ms(900), Timestamp::ZERO);
        let ruler = Ruler::new(Point::ZERO);
        let ruler_id = ruler.id();
        scene.append_shape(Shape::DistanceRuler(ruler));
        scene.schedule_expiry(ruler_id, ms(1200), Timestamp::ZERO);

        scene.clear_all();
        assert!(scene.is_empty());
        assert!(scene.run_expiries(Timestamp::from_millis(10_000)).is_empty());
        assert!(scene.is_empty());
    }

    #[test]
    fn test_replacing_ruler_cancels_old_timer() {
        let mut scene = Scene::new();
        let old = Ruler::new(Point::ZERO);
        let old_id = old.id();
        scene.append_shape(Shape::DistanceRuler(old));
        scene.schedule_expiry(old_id, ms(1200), Timestamp::ZERO);

        let new = Ruler::new(Point::new(5.0, 5.0));
        let new_id = new.id();
        scene.append_shape(Shape::DistanceRuler(new));

        assert!(scene.run_expiries(Timestamp::from_millis(1200)).is_empty());
        assert_eq!(scene.ruler().map(|r| r.id()), Some(new_id));
    }

    #[test]
    fn test_drawables_order() {
        let mut scene = Scene::new();
        let preview = Circle::new(Point::ZERO, 1.0);
        let preview_id = preview.id();
        scene.append_shape(Shape::CirclePreview(preview));
        let line = FreehandLine::new(Point::ZERO);
        let line_id = line.id();
        scene.append_shape(Shape::FreehandLine(line));
        scene.append_shape(Shape::DistanceRuler(Ruler::new(Point::ZERO)));

        let ids: Vec<_> = scene.drawables().map(|s| s.id()).collect();
        assert_eq!(ids, vec![line_id, preview_id]);
    }
}
