//! Token manipulation: drag to move, click to cycle the aura, wheel to resize it.
//!
//! Token handling ignores the current tool mode entirely.

use crate::input::EventResponse;
use crate::scene::Scene;
use crate::token::TokenId;
use kurbo::{Point, Vec2};

/// A press that landed on a token and has not been released yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenPress {
    pub token: TokenId,
    /// Where the pointer went down.
    pub origin: Point,
    /// Token position minus pointer position at press time, so the token does
    /// not jump to center under the pointer.
    pub grab_offset: Vec2,
    /// Set once the pointer travels past the click slop.
    pub dragging: bool,
}

#[derive(Debug, Clone)]
pub struct TokenHandler {
    press: Option<TokenPress>,
    click_slop: f64,
    wheel_step: f64,
}

impl TokenHandler {
    pub fn new(click_slop: f64, wheel_step: f64) -> Self {
        Self {
            press: None,
            click_slop,
            wheel_step,
        }
    }

    pub fn press(&self) -> Option<&TokenPress> {
        self.press.as_ref()
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    /// Start a press on `token`. Returns false if the token does not exist.
    pub fn pointer_down(&mut self, scene: &Scene, token: TokenId, pos: Point) -> bool {
        let Some(t) = scene.token(token) else {
            return false;
        };
        self.press = Some(TokenPress {
            token,
            origin: pos,
            grab_offset: t.position - pos,
            dragging: false,
        });
        true
    }

    /// Track the pointer while a token is pressed. Returns false when no token
    /// press is active, so the caller can route the move elsewhere.
    pub fn pointer_move(&mut self, scene: &mut Scene, pos: Point) -> bool {
        let Some(press) = self.press.as_mut() else {
            return false;
        };
        if !press.dragging && (pos - press.origin).hypot() > self.click_slop {
            press.dragging = true;
            log::debug!("Dragging token {}", press.token);
        }
        if press.dragging {
            scene.set_token_position(press.token, pos + press.grab_offset);
        }
        true
    }

    /// Finish the press: a drag commits the final position, a click cycles the aura.
    pub fn pointer_up(&mut self, scene: &mut Scene, pos: Point) -> bool {
        let Some(press) = self.press.take() else {
            return false;
        };
        if press.dragging {
            scene.set_token_position(press.token, pos + press.grab_offset);
        } else {
            scene.cycle_token_radius(press.token);
        }
        true
    }

    /// Grow or shrink the aura of `token` by one wheel step.
    ///
    /// Scrolling toward the user (`delta_y > 0`) shrinks, away grows.
    pub fn wheel(&self, scene: &mut Scene, token: TokenId, delta_y: f64) -> EventResponse {
        if scene.token(token).is_none() || delta_y == 0.0 || delta_y.is_nan() {
            return EventResponse::Ignored;
        }
        let delta = if delta_y > 0.0 { -self.wheel_step } else { self.wheel_step };
        scene.adjust_token_radius(token, delta);
        EventResponse::Consumed
    }

    /// Drop any press without touching the scene.
    pub fn cancel(&mut self) {
        self.press = None;
    }
}
