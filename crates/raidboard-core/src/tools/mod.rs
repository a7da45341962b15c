//! Tool modes and the in-progress gesture.

use crate::shapes::ShapeId;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    #[default]
    Select,
    Arrow,
    Freehand,
    Ruler,
    Ping,
    Circle,
}

impl ToolMode {
    pub const ALL: [ToolMode; 6] = [
        ToolMode::Select,
        ToolMode::Arrow,
        ToolMode::Freehand,
        ToolMode::Ruler,
        ToolMode::Ping,
        ToolMode::Circle,
    ];

    /// Display name for toolbars.
    pub fn name(self) -> &'static str {
        match self {
            ToolMode::Select => "Select",
            ToolMode::Arrow => "Arrow",
            ToolMode::Freehand => "Pen",
            ToolMode::Ruler => "Ruler",
            ToolMode::Ping => "Ping",
            ToolMode::Circle => "Circle",
        }
    }
}

/// State of the gesture currently being drawn.
///
/// Each variant carries only what its own tool needs, so switching tools can
/// never leave another tool's anchor behind.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    /// Nothing in progress.
    #[default]
    Idle,
    /// Drawing the freehand line with this id.
    Freehand { id: ShapeId },
    /// Dragging out an arrow from `anchor`.
    Arrow { anchor: Point },
    /// Measuring with the ruler `id`, anchored at `start`.
    Ruler { id: ShapeId, start: Point },
    /// Growing a circle around `anchor`.
    Circle { anchor: Point },
}

impl Gesture {
    /// The tool that owns this gesture.
    pub fn mode(&self) -> Option<ToolMode> {
        match self {
            Gesture::Idle => None,
            Gesture::Freehand { .. } => Some(ToolMode::Freehand),
            Gesture::Arrow { .. } => Some(ToolMode::Arrow),
            Gesture::Ruler { .. } => Some(ToolMode::Ruler),
            Gesture::Circle { .. } => Some(ToolMode::Circle),
        }
    }
}

/// Manages the current tool and its gesture.
#[derive(Debug, Clone, Default)]
pub struct ToolController {
    mode: ToolMode,
    gesture: Gesture,
}

impl ToolController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    /// Switch tools. Always allowed, even mid-gesture.
    ///
    /// Returns the gesture that was abandoned so the caller can tidy up any
    /// preview it left in the scene. Re-selecting the current tool abandons
    /// nothing.
    pub fn set_mode(&mut self, mode: ToolMode) -> Gesture {
        if mode == self.mode {
            return Gesture::Idle;
        }
        log::debug!("Tool mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        std::mem::take(&mut self.gesture)
    }

    /// Start a gesture, replacing any gesture still in progress.
    pub fn begin(&mut self, gesture: Gesture) -> Gesture {
        std::mem::replace(&mut self.gesture, gesture)
    }

    /// End the current gesture, returning it.
    pub fn finish(&mut self) -> Gesture {
        std::mem::take(&mut self.gesture)
    }
}
