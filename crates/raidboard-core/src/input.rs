//! Pointer events and their interpretation under the active tool.

use crate::clock::Timestamp;
use crate::config::BoardConfig;
use crate::geometry::distance;
use crate::scene::{Scene, ShapePatch};
use crate::shapes::{Arrow, Circle, FreehandLine, Ping, Ruler, Shape, ShapeKind};
use crate::tools::{Gesture, ToolController, ToolMode};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pointer event in stage coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
    /// Positive `delta_y` means the wheel rolled toward the user.
    Wheel { position: Point, delta_y: f64 },
}

/// Whether the host should stop its default handling of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResponse {
    /// The board handled the event; suppress default behavior (e.g. page scroll).
    Consumed,
    /// The board did not use the event.
    Ignored,
}

/// Turns pointer down/move/up into scene edits according to the tool mode.
#[derive(Debug, Clone, Copy)]
pub struct PointerInterpreter {
    ping_lifetime: Duration,
    ruler_lifetime: Duration,
}

impl Default for PointerInterpreter {
    fn default() -> Self {
        Self::from_config(&BoardConfig::default())
    }
}

impl PointerInterpreter {
    pub fn new(ping_lifetime: Duration, ruler_lifetime: Duration) -> Self {
        Self {
            ping_lifetime,
            ruler_lifetime,
        }
    }

    pub fn from_config(config: &BoardConfig) -> Self {
        Self::new(config.ping_lifetime(), config.ruler_lifetime())
    }

    pub fn pointer_down(&self, tools: &mut ToolController, scene: &mut Scene, pos: Point, now: Timestamp) {
        // A gesture still open here lost its pointer-up; drop it before starting over.
        let stale = tools.finish();
        self.abandon(stale, scene);

        match tools.mode() {
            ToolMode::Freehand => {
                let line = FreehandLine::new(pos);
                let id = line.id();
                scene.append_shape(Shape::FreehandLine(line));
                tools.begin(Gesture::Freehand { id });
            }
            ToolMode::Arrow => {
                tools.begin(Gesture::Arrow { anchor: pos });
            }
            ToolMode::Ruler => {
                let ruler = Ruler::new(pos);
                let id = ruler.id();
                scene.append_shape(Shape::DistanceRuler(ruler));
                tools.begin(Gesture::Ruler { id, start: pos });
            }
            ToolMode::Ping => {
                let ping = Ping::new(pos, now);
                let id = ping.id();
                scene.append_shape(Shape::Ping(ping));
                scene.schedule_expiry(id, self.ping_lifetime, now);
            }
            ToolMode::Circle => {
                scene.append_shape(Shape::CirclePreview(Circle::new(pos, 0.0)));
                tools.begin(Gesture::Circle { anchor: pos });
            }
            ToolMode::Select => {}
        }
    }

    pub fn pointer_move(&self, tools: &ToolController, scene: &mut Scene, pos: Point) {
        match *tools.gesture() {
            Gesture::Idle => {}
            Gesture::Freehand { id } => {
                scene.update_shape(id, ShapePatch::AppendPoint(pos));
            }
            Gesture::Arrow { anchor } => match scene.arrow_preview().map(|a| a.id()) {
                Some(id) => {
                    scene.update_shape(id, ShapePatch::SetEnd(pos));
                }
                None => scene.append_shape(Shape::ArrowPreview(Arrow::new(anchor, pos))),
            },
            Gesture::Ruler { id, .. } => {
                scene.update_shape(id, ShapePatch::SetEnd(pos));
            }
            Gesture::Circle { anchor } => {
                if let Some(id) = scene.circle_preview().map(|c| c.id()) {
                    scene.update_shape(id, ShapePatch::SetRadius(distance(anchor, pos)));
                }
            }
        }
    }

    pub fn pointer_up(&self, tools: &mut ToolController, scene: &mut Scene, pos: Point, now: Timestamp) {
        match tools.finish() {
            Gesture::Idle => {}
            Gesture::Freehand { id } => {
                log::debug!("Finished freehand line {id}");
            }
            Gesture::Arrow { anchor } => {
                scene.replace_shapes_of_kind(ShapeKind::ArrowPreview, None);
                let arrow = Arrow::new(anchor, pos);
                log::debug!("Committed arrow {}", arrow.id());
                scene.append_shape(Shape::Arrow(arrow));
            }
            Gesture::Ruler { id, .. } => {
                scene.schedule_expiry(id, self.ruler_lifetime, now);
            }
            Gesture::Circle { anchor } => {
                scene.replace_shapes_of_kind(ShapeKind::CirclePreview, None);
                let marker = Circle::through(anchor, pos);
                log::debug!("Committed circle marker {} (r={})", marker.id(), marker.radius);
                scene.append_shape(Shape::CircleMarker(marker));
            }
        }
    }

    /// Route a down/move/up event. Wheel events are not drawing input and are ignored.
    pub fn handle(&self, event: PointerEvent, tools: &mut ToolController, scene: &mut Scene, now: Timestamp) {
        match event {
            PointerEvent::Down { position } => self.pointer_down(tools, scene, position, now),
            PointerEvent::Move { position } => self.pointer_move(tools, scene, position),
            PointerEvent::Up { position } => self.pointer_up(tools, scene, position, now),
            PointerEvent::Wheel { .. } => {}
        }
    }

    /// Switch tools, discarding whatever the abandoned gesture left behind.
    pub fn set_mode(&self, tools: &mut ToolController, scene: &mut Scene, mode: ToolMode) {
        let abandoned = tools.set_mode(mode);
        self.abandon(abandoned, scene);
    }

    /// Remove the previews of a gesture that will never complete.
    ///
    /// A freehand line is already permanent and stays.
    pub fn abandon(&self, gesture: Gesture, scene: &mut Scene) {
        match gesture {
            Gesture::Idle | Gesture::Freehand { .. } => {}
            Gesture::Arrow { .. } => scene.replace_shapes_of_kind(ShapeKind::ArrowPreview, None),
            Gesture::Ruler { id, .. } => {
                scene.remove_shape(id);
            }
            Gesture::Circle { .. } => scene.replace_shapes_of_kind(ShapeKind::CirclePreview, None),
        }
        if gesture != Gesture::Idle {
            log::debug!("Cancelled {:?} gesture", gesture.mode());
        }
    }
}
