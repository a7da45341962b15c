//! Image export requests.

use serde::{Deserialize, Serialize};

// Use web-time on WASM, std::time otherwise
#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

/// What the export collaborator should produce: a raster of the current board
/// at `pixel_ratio` times the stage size, saved as `file_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub file_name: String,
    pub pixel_ratio: f64,
}

impl ExportRequest {
    pub fn new(prefix: &str, pixel_ratio: f64, unix_ms: u64) -> Self {
        Self {
            file_name: export_file_name(prefix, unix_ms),
            pixel_ratio,
        }
    }
}

/// `<prefix>-<unix millis>.png`
pub fn export_file_name(prefix: &str, unix_ms: u64) -> String {
    format!("{prefix}-{unix_ms}.png")
}

/// Wall-clock milliseconds since the Unix epoch.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        assert_eq!(
            export_file_name("raid-whiteboard", 1_700_000_000_123),
            "raid-whiteboard-1700000000123.png"
        );
    }

    #[test]
    fn test_request_keeps_ratio() {
        let request = ExportRequest::new("raid-whiteboard", 2.0, 0);
        assert_eq!(request.pixel_ratio, 2.0);
        assert_eq!(request.file_name, "raid-whiteboard-0.png");
    }

    #[test]
    fn test_unix_millis_is_recent() {
        // 2020-01-01
        assert!(unix_millis() > 1_577_836_800_000);
    }
}
