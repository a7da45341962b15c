//! Raidboard Render Library
//!
//! Turns a board into an ordered list of drawing commands, and draw lists into
//! PNG exports.

mod draw_list;
mod png_export;
mod raster;
mod renderer;

pub use draw_list::{DrawItem, StrokeStyle, TextAlign, build_draw_list};
pub use png_export::{encode_png, write_png};
pub use raster::{RgbaFrame, rasterize};
pub use renderer::{RecordingRenderer, RenderContext, RenderResult, Renderer, RendererError};
