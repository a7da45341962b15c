//! Renderer trait abstraction.

use crate::draw_list::{DrawItem, build_draw_list};
use kurbo::Size;
use peniko::Color;
use raidboard_core::board::Board;
use raidboard_core::color::TokenColor;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Invalid frame: {width}x{height} needs {expected} bytes, got {actual}")]
    InvalidFrame {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("Frame size {width}x{height} is outside 1..=32767 px")]
    FrameSize { width: u32, height: u32 },
    #[error("Cairo error: {0}")]
    Cairo(#[from] cairo::Error),
    #[error("Surface data unavailable: {0}")]
    SurfaceBorrow(#[from] cairo::BorrowError),
    #[error("Background image decoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The board to render.
    pub board: &'a Board,
    /// Viewport size in logical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (2.0 for exports).
    pub scale_factor: f64,
    /// Stage fill behind everything.
    pub background_color: TokenColor,
    /// Whether to draw the alignment grid.
    pub show_grid: bool,
}

impl<'a> RenderContext<'a> {
    /// Create a context covering the board's stage.
    pub fn new(board: &'a Board) -> Self {
        let config = board.config();
        Self {
            board,
            viewport_size: Size::new(config.stage_width, config.stage_height),
            scale_factor: 1.0,
            background_color: TokenColor::rgb(0x11, 0x13, 0x18),
            show_grid: true,
        }
    }

    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_background(mut self, color: TokenColor) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_grid(mut self, show: bool) -> Self {
        self.show_grid = show;
        self
    }

    /// Frame size in physical pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        let scale = |v: f64| (v * self.scale_factor).round().max(1.0) as u32;
        (scale(self.viewport_size.width), scale(self.viewport_size.height))
    }
}

/// Trait for rendering backends.
pub trait Renderer: Send + Sync {
    /// Build the drawing commands for a frame.
    ///
    /// Called after every board change.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color.into()
    }
}

/// Renderer that keeps the last draw list, for headless hosts and tests.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    items: Vec<DrawItem>,
    frames: u64,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    pub fn take_items(&mut self) -> Vec<DrawItem> {
        std::mem::take(&mut self.items)
    }

    /// Number of frames built so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for RecordingRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.items = build_draw_list(ctx);
        self.frames += 1;
        log::debug!("Built frame {} with {} items", self.frames, self.items.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raidboard_core::config::BoardConfig;

    #[test]
    fn test_context_defaults_to_stage() {
        let board = Board::new(BoardConfig::default());
        let ctx = RenderContext::new(&board).with_scale_factor(2.0);
        assert_eq!(ctx.viewport_size, Size::new(1100.0, 680.0));
        assert_eq!(ctx.physical_size(), (2200, 1360));
    }

    #[test]
    fn test_recording_renderer_keeps_last_frame() {
        let mut board = Board::new(BoardConfig::default());
        let mut renderer = RecordingRenderer::new();

        renderer.build_scene(&RenderContext::new(&board));
        let empty = renderer.items().len();
        board.add_palette_token(0);
        renderer.build_scene(&RenderContext::new(&board));

        assert_eq!(renderer.frames(), 2);
        assert!(renderer.items().len() > empty);
        let bg = renderer.background_color(&RenderContext::new(&board)).to_rgba8();
        assert_eq!((bg.r, bg.g, bg.b, bg.a), (0x11, 0x13, 0x18, 255));
    }
}
