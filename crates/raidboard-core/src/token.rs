//! Draggable unit tokens.

use crate::color::TokenColor;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for tokens.
pub type TokenId = Uuid;

/// Aura radius values visited by a click, in order. Anything else cycles back to 0.
pub const AURA_CYCLE: [f64; 3] = [0.0, 100.0, 150.0];

/// A unit marker placed on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub(crate) id: TokenId,
    /// Center in stage coordinates.
    pub position: Point,
    pub(crate) label: String,
    pub(crate) color: TokenColor,
    /// Aura ring radius; 0 hides the ring.
    pub radius: f64,
    /// Reserved for drag-locking; not consulted yet.
    pub locked: bool,
}

impl Token {
    pub fn new(position: Point, label: impl Into<String>, color: TokenColor) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            label: label.into(),
            color,
            radius: 0.0,
            locked: false,
        }
    }

    pub fn id(&self) -> TokenId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn color(&self) -> TokenColor {
        self.color
    }

    /// Advance the aura through 0 -> 100 -> 150 -> 0.
    pub fn cycle_radius(&mut self) {
        self.radius = next_aura_radius(self.radius);
    }

    /// Add `delta` to the aura radius, never going below 0.
    pub fn adjust_radius(&mut self, delta: f64) {
        self.radius = (self.radius + delta).max(0.0);
    }

    /// Whether `point` falls on the token's marker disk.
    pub fn contains(&self, point: Point, marker_radius: f64) -> bool {
        self.position.distance(point) <= marker_radius
    }
}

/// The aura radius following `current` in the click cycle.
pub fn next_aura_radius(current: f64) -> f64 {
    match AURA_CYCLE.iter().position(|&r| r == current) {
        Some(i) => AURA_CYCLE[(i + 1) % AURA_CYCLE.len()],
        None => AURA_CYCLE[0],
    }
}
