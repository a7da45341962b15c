//! The board: scene, tools, token handling, background and timers behind one API.
//!
//! Hosts feed pointer events and commands in, call [`Board::tick`] from their
//! frame loop, and read the scene back out for rendering.

use crate::background::{Background, BackgroundError, BackgroundImage, LoadOutcome};
use crate::clock::{Clock, SystemClock, Timestamp};
use crate::color::TokenColor;
use crate::config::BoardConfig;
use crate::export::{ExportRequest, unix_millis};
use crate::input::{EventResponse, PointerEvent, PointerInterpreter};
use crate::interaction::{TokenHandler, TokenPress};
use crate::scene::Scene;
use crate::shapes::ShapeId;
use crate::tools::{Gesture, ToolController, ToolMode};
use crate::token::TokenId;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// User-facing messages the host should surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    BackgroundLoadFailed { url: String, reason: String },
}

pub struct Board {
    config: BoardConfig,
    scene: Scene,
    tools: ToolController,
    interpreter: PointerInterpreter,
    token_handler: TokenHandler,
    background: Background,
    clock: Box<dyn Clock>,
    notifications: Vec<Notification>,
}

impl Board {
    /// Create a board driven by the wall clock.
    pub fn new(config: BoardConfig) -> Self {
        Self::with_clock(config, SystemClock::new())
    }

    pub fn with_clock(config: BoardConfig, clock: impl Clock + 'static) -> Self {
        Self {
            interpreter: PointerInterpreter::from_config(&config),
            token_handler: TokenHandler::new(config.click_slop, config.wheel_step),
            config,
            scene: Scene::new(),
            tools: ToolController::new(),
            background: Background::new(),
            clock: Box::new(clock),
            notifications: Vec::new(),
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn mode(&self) -> ToolMode {
        self.tools.mode()
    }

    pub fn gesture(&self) -> &Gesture {
        self.tools.gesture()
    }

    pub fn token_press(&self) -> Option<&TokenPress> {
        self.token_handler.press()
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    // --- Commands ---------------------------------------------------------

    pub fn set_mode(&mut self, mode: ToolMode) {
        self.interpreter.set_mode(&mut self.tools, &mut self.scene, mode);
    }

    /// Add a token near the stage center.
    pub fn add_token(&mut self, label: impl Into<String>, color: TokenColor) -> TokenId {
        let center = self.config.stage_center();
        self.scene
            .add_token(label, color, center, self.config.spawn_jitter)
            .id()
    }

    /// Add a token from palette entry `index`. Out of range adds nothing.
    pub fn add_palette_token(&mut self, index: usize) -> Option<TokenId> {
        let entry = self.config.palette.get(index)?.clone();
        Some(self.add_token(entry.label, entry.color))
    }

    // --- Pointer input ----------------------------------------------------

    /// A press on a token belongs to the token for its whole duration; any
    /// other press goes to the active drawing tool.
    pub fn pointer_down(&mut self, pos: Point) {
        self.token_handler.cancel();
        if let Some(token) = self.scene.token_at(pos, self.config.token_marker_radius) {
            let stale = self.tools.finish();
            self.interpreter.abandon(stale, &mut self.scene);
            self.token_handler.pointer_down(&self.scene, token, pos);
            return;
        }
        let now = self.clock.now();
        self.interpreter
            .pointer_down(&mut self.tools, &mut self.scene, pos, now);
    }

    pub fn pointer_move(&mut self, pos: Point) {
        if !self.token_handler.pointer_move(&mut self.scene, pos) {
            self.interpreter.pointer_move(&self.tools, &mut self.scene, pos);
        }
    }

    pub fn pointer_up(&mut self, pos: Point) {
        if !self.token_handler.pointer_up(&mut self.scene, pos) {
            let now = self.clock.now();
            self.interpreter
                .pointer_up(&mut self.tools, &mut self.scene, pos, now);
        }
    }

    /// Wheel over a token resizes its aura and must not scroll the page.
    pub fn wheel(&mut self, pos: Point, delta_y: f64) -> EventResponse {
        match self.scene.token_at(pos, self.config.token_marker_radius) {
            Some(token) => self.token_handler.wheel(&mut self.scene, token, delta_y),
            None => EventResponse::Ignored,
        }
    }

    pub fn handle_event(&mut self, event: PointerEvent) -> EventResponse {
        match event {
            PointerEvent::Down { position } => self.pointer_down(position),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { position } => self.pointer_up(position),
            PointerEvent::Wheel { position, delta_y } => return self.wheel(position, delta_y),
        }
        EventResponse::Consumed
    }

    // --- Background -------------------------------------------------------

    /// Request a background. Returns the URL the host should start loading;
    /// a blank URL clears the background and returns `None`.
    pub fn set_background_url(&mut self, url: &str) -> Option<String> {
        self.background.request(url)
    }

    pub fn complete_background_load(
        &mut self,
        url: &str,
        result: Result<BackgroundImage, BackgroundError>,
    ) -> LoadOutcome {
        let outcome = self.background.complete(url, result);
        if let LoadOutcome::Failed(err) = &outcome {
            self.notifications.push(Notification::BackgroundLoadFailed {
                url: url.to_string(),
                reason: err.to_string(),
            });
        }
        outcome
    }

    pub fn clear_background(&mut self) {
        self.background.clear();
    }

    // --- Export and clear -------------------------------------------------

    pub fn export_request(&self) -> ExportRequest {
        let request = ExportRequest::new(
            &self.config.export_file_prefix,
            self.config.export_pixel_ratio,
            unix_millis(),
        );
        log::info!("Exporting board as {}", request.file_name);
        request
    }

    /// Wipe tokens and shapes after `confirm` agrees. Returns whether the
    /// board was cleared.
    ///
    /// The background is kept. Pending timers die with their shapes.
    pub fn clear_board(&mut self, confirm: impl FnOnce() -> bool) -> bool {
        if !confirm() {
            log::debug!("Board clear declined");
            return false;
        }
        self.tools.finish();
        self.token_handler.cancel();
        self.scene.clear_all();
        log::info!("Board cleared");
        true
    }

    // --- Timers and notices -----------------------------------------------

    /// Fire every timer that is due. Returns the ids of the shapes removed.
    pub fn tick(&mut self) -> Vec<ShapeId> {
        let now = self.clock.now();
        self.scene.run_expiries(now)
    }

    /// Earliest pending timer deadline, for hosts that sleep between ticks.
    pub fn next_expiry(&self) -> Option<Timestamp> {
        self.scene.next_expiry()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}
