//! Raidboard Core Library
//!
//! Platform-agnostic state and interaction logic for the raid annotation board:
//! tokens, drawing tools, timed overlays and the background image.

pub mod background;
pub mod board;
pub mod clock;
pub mod color;
pub mod config;
pub mod expiry;
pub mod export;
pub mod geometry;
pub mod input;
pub mod interaction;
pub mod scene;
pub mod shapes;
pub mod token;
pub mod tools;

pub use background::{Background, BackgroundError, BackgroundImage, BackgroundLoader, LoadOutcome, LoadState};
pub use board::{Board, Notification};
pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use color::TokenColor;
pub use config::{BoardConfig, ConfigError, PaletteEntry};
pub use export::ExportRequest;
pub use input::{EventResponse, PointerEvent, PointerInterpreter};
pub use interaction::TokenHandler;
pub use scene::{Scene, ShapePatch};
pub use shapes::{Shape, ShapeId, ShapeKind};
pub use token::{Token, TokenId};
pub use tools::{Gesture, ToolController, ToolMode};
