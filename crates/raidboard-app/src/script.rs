//! Scripted board sessions.
//!
//! A script is a JSON list of steps replayed in order:
//!
//! ```json
//! { "steps": [
//!   { "step": "add_token", "label": "Tank", "color": "#ff6b6b" },
//!   { "step": "set_mode", "mode": "circle" },
//!   { "step": "down", "x": 100, "y": 100 },
//!   { "step": "up", "x": 150, "y": 100 },
//!   { "step": "wait", "ms": 1000 }
//! ] }
//! ```

use raidboard_core::color::TokenColor;
use raidboard_core::tools::ToolMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Script errors.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to read script: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid script JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn default_true() -> bool {
    true
}

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    SetMode { mode: ToolMode },
    AddToken { label: String, color: TokenColor },
    /// Add the palette entry at `index`.
    Palette { index: usize },
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    Wheel { x: f64, y: f64, delta_y: f64 },
    /// Advance the clock and fire due timers.
    Wait { ms: u64 },
    Background { url: String },
    /// `confirm: false` simulates the user declining the prompt.
    Clear {
        #[serde(default = "default_true")]
        confirm: bool,
    },
    /// Write a PNG of the board, into `dir` or the app's output directory.
    Export {
        #[serde(default)]
        dir: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps() {
        let script = Script::from_json(
            r##"{ "steps": [
                { "step": "set_mode", "mode": "ruler" },
                { "step": "add_token", "label": "Boss", "color": "#fff" },
                { "step": "wheel", "x": 1, "y": 2, "delta_y": -120 },
                { "step": "clear" },
                { "step": "clear", "confirm": false },
                { "step": "export" }
            ] }"##,
        )
        .unwrap();

        assert_eq!(
            script.steps,
            vec![
                Step::SetMode { mode: ToolMode::Ruler },
                Step::AddToken {
                    label: "Boss".into(),
                    color: TokenColor::white()
                },
                Step::Wheel {
                    x: 1.0,
                    y: 2.0,
                    delta_y: -120.0
                },
                Step::Clear { confirm: true },
                Step::Clear { confirm: false },
                Step::Export { dir: None },
            ]
        );
    }

    #[test]
    fn test_unknown_step_is_rejected() {
        let err = Script::from_json(r#"{ "steps": [{ "step": "teleport" }] }"#);
        assert!(matches!(err, Err(ScriptError::Json(_))));
    }
}
