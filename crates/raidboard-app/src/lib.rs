//! Raidboard Application
//!
//! Headless shell that replays scripted sessions against a board and reports
//! what would be drawn.

mod app;
mod loader;
mod script;

pub use app::{App, AppConfig, AppError, Report};
pub use loader::FileLoader;
pub use script::{Script, ScriptError, Step};
