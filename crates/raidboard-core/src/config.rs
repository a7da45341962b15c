//! Board configuration: stage size, palette, timings and input tuning.
//!
//! Every field has a default, so an empty JSON object is a valid config.
//!
//! ```json
//! {
//!   "stage_width": 1280,
//!   "ping_lifetime_ms": 900,
//!   "palette": [{ "label": "Tank", "color": "#ff6b6b" }]
//! }
//! ```

use crate::color::TokenColor;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Largest exported frame edge, in physical pixels.
pub const MAX_EXPORT_DIMENSION: f64 = 16384.0;

/// One palette button: the label and color given to new tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub label: String,
    pub color: TokenColor,
}

impl PaletteEntry {
    pub fn new(label: impl Into<String>, color: TokenColor) -> Self {
        Self {
            label: label.into(),
            color,
        }
    }
}

/// The built-in raid roles.
pub fn default_palette() -> Vec<PaletteEntry> {
    vec![
        PaletteEntry::new("Tank", TokenColor::rgb(0xff, 0x6b, 0x6b)),
        PaletteEntry::new("Melee DPS", TokenColor::rgb(0xfe, 0xca, 0x57)),
        PaletteEntry::new("Caster DPS", TokenColor::rgb(0x5f, 0x27, 0xcd)),
        PaletteEntry::new("Pure Healer", TokenColor::rgb(0x48, 0xdb, 0xfb)),
        PaletteEntry::new("Barrier Healer", TokenColor::rgb(0x1d, 0xd1, 0xa1)),
        PaletteEntry::new("Boss", TokenColor::white()),
        PaletteEntry::new("Add", TokenColor::rgb(0xc0, 0xc0, 0xc0)),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Stage width in pixels.
    pub stage_width: f64,
    /// Stage height in pixels.
    pub stage_height: f64,
    /// New tokens land within +/- this many pixels of the stage center.
    pub spawn_jitter: f64,
    /// Spacing of the background grid.
    pub grid_spacing: f64,
    pub ping_lifetime_ms: u64,
    pub ruler_lifetime_ms: u64,
    /// Aura radius change per wheel tick.
    pub wheel_step: f64,
    /// Pointer travel beyond which a token press becomes a drag.
    pub click_slop: f64,
    /// Radius of the token disk, used for hit-testing presses.
    pub token_marker_radius: f64,
    /// Pixel density multiplier for exported images.
    pub export_pixel_ratio: f64,
    /// Exported files are named `<prefix>-<unix millis>.png`.
    pub export_file_prefix: String,
    pub palette: Vec<PaletteEntry>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            stage_width: 1100.0,
            stage_height: 680.0,
            spawn_jitter: 20.0,
            grid_spacing: 40.0,
            ping_lifetime_ms: 900,
            ruler_lifetime_ms: 1200,
            wheel_step: 5.0,
            click_slop: 4.0,
            token_marker_radius: 18.0,
            export_pixel_ratio: 2.0,
            export_file_prefix: "raid-whiteboard".to_string(),
            palette: default_palette(),
        }
    }
}

impl BoardConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded config from {:?}", path.as_ref());
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the board cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must be positive, got {v}")))
            }
        };
        positive("stage_width", self.stage_width)?;
        positive("stage_height", self.stage_height)?;
        positive("grid_spacing", self.grid_spacing)?;
        positive("export_pixel_ratio", self.export_pixel_ratio)?;
        positive("token_marker_radius", self.token_marker_radius)?;
        for (name, v) in [("stage_width", self.stage_width), ("stage_height", self.stage_height)] {
            let exported = v * self.export_pixel_ratio;
            if v.max(exported) > MAX_EXPORT_DIMENSION {
                return Err(ConfigError::Invalid(format!(
                    "{name} of {v} at pixel ratio {} exceeds {MAX_EXPORT_DIMENSION} px",
                    self.export_pixel_ratio
                )));
            }
        }
        for (name, v) in [
            ("spawn_jitter", self.spawn_jitter),
            ("wheel_step", self.wheel_step),
            ("click_slop", self.click_slop),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must not be negative, got {v}")));
            }
        }
        if self.export_file_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("export_file_prefix must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn ping_lifetime(&self) -> Duration {
        Duration::from_millis(self.ping_lifetime_ms)
    }

    pub fn ruler_lifetime(&self) -> Duration {
        Duration::from_millis(self.ruler_lifetime_ms)
    }

    /// Center of the stage, where new tokens spawn.
    pub fn stage_center(&self) -> kurbo::Point {
        kurbo::Point::new(self.stage_width / 2.0, self.stage_height / 2.0)
    }
}
