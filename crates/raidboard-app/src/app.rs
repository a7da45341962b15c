//! Headless application: drives a board from a script and reports the result.

use crate::loader::FileLoader;
use crate::script::{Script, ScriptError, Step};
use kurbo::Point;
use raidboard_core::background::BackgroundLoader;
use raidboard_core::board::{Board, Notification};
use raidboard_core::clock::{Clock, ManualClock};
use raidboard_core::config::{BoardConfig, ConfigError};
use raidboard_core::input::PointerEvent;
use raidboard_render::{
    DrawItem, RecordingRenderer, RenderContext, Renderer, RendererError, rasterize, write_png,
};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error(transparent)]
    Render(#[from] RendererError),
    #[error("Failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub board: BoardConfig,
    /// Relative background paths resolve against this directory.
    pub asset_dir: PathBuf,
    /// Where exports land unless a step names a directory.
    pub output_dir: PathBuf,
    pub show_grid: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            asset_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            show_grid: true,
        }
    }
}

/// Final state of a replayed session.
#[derive(Debug, Serialize)]
pub struct Report {
    pub draw_list: Vec<DrawItem>,
    pub notifications: Vec<Notification>,
    pub exports: Vec<PathBuf>,
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    board: Board,
    clock: ManualClock,
    loader: FileLoader,
    renderer: RecordingRenderer,
    notifications: Vec<Notification>,
    exports: Vec<PathBuf>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let clock = ManualClock::new();
        Self {
            board: Board::with_clock(config.board.clone(), clock.clone()),
            loader: FileLoader::new(config.asset_dir.clone()),
            clock,
            renderer: RecordingRenderer::new(),
            notifications: Vec::new(),
            exports: Vec::new(),
            config,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Replay every step, redrawing after each one.
    pub fn run(mut self, script: &Script) -> Result<Report, AppError> {
        log::info!("Replaying {} steps", script.steps.len());
        for step in &script.steps {
            self.apply(step)?;
            self.redraw();
        }
        if self.renderer.frames() == 0 {
            self.redraw();
        }
        Ok(Report {
            draw_list: self.renderer.take_items(),
            notifications: self.notifications,
            exports: self.exports,
        })
    }

    fn redraw(&mut self) {
        let ctx = RenderContext::new(&self.board).with_grid(self.config.show_grid);
        self.renderer.build_scene(&ctx);
    }

    fn apply(&mut self, step: &Step) -> Result<(), AppError> {
        log::debug!("Step {step:?}");
        match step {
            Step::SetMode { mode } => self.board.set_mode(*mode),
            Step::AddToken { label, color } => {
                self.board.add_token(label.clone(), *color);
            }
            Step::Palette { index } => {
                if self.board.add_palette_token(*index).is_none() {
                    log::warn!("No palette entry at index {index}");
                }
            }
            Step::Down { x, y } => self.pointer(PointerEvent::Down {
                position: Point::new(*x, *y),
            }),
            Step::Move { x, y } => self.pointer(PointerEvent::Move {
                position: Point::new(*x, *y),
            }),
            Step::Up { x, y } => self.pointer(PointerEvent::Up {
                position: Point::new(*x, *y),
            }),
            Step::Wheel { x, y, delta_y } => self.pointer(PointerEvent::Wheel {
                position: Point::new(*x, *y),
                delta_y: *delta_y,
            }),
            Step::Wait { ms } => self.wait(Duration::from_millis(*ms)),
            Step::Background { url } => self.load_background(url),
            Step::Clear { confirm } => {
                let confirm = *confirm;
                self.board.clear_board(|| confirm);
            }
            Step::Export { dir } => {
                let dir = dir.clone().unwrap_or_else(|| self.config.output_dir.clone());
                let path = self.export(dir)?;
                self.exports.push(path);
            }
        }
        self.board.tick();
        for notice in self.board.drain_notifications() {
            log::warn!("{notice:?}");
            self.notifications.push(notice);
        }
        Ok(())
    }

    fn pointer(&mut self, event: PointerEvent) {
        let response = self.board.handle_event(event);
        log::trace!("{event:?} -> {response:?}");
    }

    /// Advance the clock, stopping at each timer deadline on the way so
    /// overlays expire in order.
    fn wait(&mut self, by: Duration) {
        let target = self.clock.now().after(by);
        while let Some(due) = self.board.next_expiry().filter(|due| *due <= target) {
            self.clock.set(due.max(self.clock.now()));
            for id in self.board.tick() {
                log::debug!("Expired {id} at {} ms", due.as_millis());
            }
        }
        self.clock.set(target);
    }

    fn load_background(&mut self, url: &str) {
        if let Some(url) = self.board.set_background_url(url) {
            let result = pollster::block_on(self.loader.load(&url));
            self.board.complete_background_load(&url, result);
        }
    }

    fn export(&self, dir: PathBuf) -> Result<PathBuf, AppError> {
        let request = self.board.export_request();
        let ctx = RenderContext::new(&self.board)
            .with_grid(self.config.show_grid)
            .with_scale_factor(request.pixel_ratio);
        let frame = rasterize(&ctx)?;
        Ok(write_png(dir, &request, &frame)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let board = BoardConfig {
            spawn_jitter: 0.0,
            ..BoardConfig::default()
        };
        App::new(AppConfig {
            board,
            show_grid: false,
            ..AppConfig::default()
        })
    }

    fn run(json: &str) -> Report {
        app().run(&Script::from_json(json).unwrap()).unwrap()
    }

    #[test]
    fn test_circle_session() {
        let report = run(
            r#"{ "steps": [
                { "step": "set_mode", "mode": "circle" },
                { "step": "down", "x": 100, "y": 100 },
                { "step": "move", "x": 150, "y": 100 },
                { "step": "up", "x": 150, "y": 100 }
            ] }"#,
        );
        assert_eq!(report.draw_list.len(), 2);
        assert!(matches!(
            &report.draw_list[1],
            DrawItem::Circle { radius, stroke: Some(s), .. } if *radius == 50.0 && s.dash.is_none()
        ));
    }

    #[test]
    fn test_ping_gone_after_wait() {
        let report = run(
            r#"{ "steps": [
                { "step": "set_mode", "mode": "ping" },
                { "step": "down", "x": 10, "y": 10 },
                { "step": "up", "x": 10, "y": 10 },
                { "step": "wait", "ms": 900 }
            ] }"#,
        );
        assert_eq!(report.draw_list.len(), 1);
    }

    #[test]
    fn test_wait_expires_only_due_pings() {
        let report = run(
            r#"{ "steps": [
                { "step": "set_mode", "mode": "ping" },
                { "step": "down", "x": 10, "y": 10 },
                { "step": "up", "x": 10, "y": 10 },
                { "step": "wait", "ms": 400 },
                { "step": "down", "x": 90, "y": 90 },
                { "step": "up", "x": 90, "y": 90 },
                { "step": "wait", "ms": 600 }
            ] }"#,
        );
        match &report.draw_list[1..] {
            [DrawItem::Circle { center, .. }] => assert_eq!(*center, Point::new(90.0, 90.0)),
            other => panic!("unexpected items {other:?}"),
        }
    }

    #[test]
    fn test_declined_clear_keeps_tokens() {
        let report = run(
            r#"{ "steps": [
                { "step": "palette", "index": 0 },
                { "step": "clear", "confirm": false }
            ] }"#,
        );
        // Fill, token disk and label.
        assert_eq!(report.draw_list.len(), 3);
    }

    #[test]
    fn test_missing_background_is_reported() {
        let report = run(r#"{ "steps": [{ "step": "background", "url": "no-such-map.png" }] }"#);
        assert!(matches!(
            &report.notifications[..],
            [Notification::BackgroundLoadFailed { url, .. }] if url == "no-such-map.png"
        ));
        assert_eq!(report.draw_list.len(), 1);
    }

    #[test]
    fn test_export_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let script = Script {
            steps: vec![
                Step::Palette { index: 0 },
                Step::Export {
                    dir: Some(dir.path().to_path_buf()),
                },
            ],
        };
        let report = app().run(&script).unwrap();
        assert_eq!(report.exports.len(), 1);

        let image = image::open(&report.exports[0]).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (2200, 1360));
    }

    #[test]
    fn test_export_contains_scene() {
        let dir = tempfile::tempdir().unwrap();
        let mut script = Script::from_json(
            r#"{ "steps": [
                { "step": "palette", "index": 0 },
                { "step": "set_mode", "mode": "arrow" },
                { "step": "down", "x": 100, "y": 500 },
                { "step": "move", "x": 300, "y": 500 },
                { "step": "up", "x": 300, "y": 500 }
            ] }"#,
        )
        .unwrap();
        script.steps.push(Step::Export {
            dir: Some(dir.path().to_path_buf()),
        });
        let report = app().run(&script).unwrap();
        let image = image::open(&report.exports[0]).unwrap().to_rgba8();

        // Pixel ratio 2: stage (550, 355) inside the Tank disk, below its label.
        assert_eq!(image.get_pixel(1100, 710).0, [0xff, 0x6b, 0x6b, 255]);
        // Arrow shaft at stage (200, 500).
        assert_eq!(image.get_pixel(400, 999).0, [255, 255, 255, 255]);
        // Untouched stage.
        assert_eq!(image.get_pixel(40, 40).0, [0x11, 0x13, 0x18, 255]);
    }
}
