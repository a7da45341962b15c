//! Background loader reading images from the local filesystem.

use raidboard_core::background::{
    BackgroundError, BackgroundImage, BackgroundLoader, BackgroundResult, BoxFuture,
};
use std::path::{Path, PathBuf};

/// Loads `file://` URLs and plain paths, relative ones against `root`.
pub struct FileLoader {
    root: PathBuf,
}

impl FileLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a background URL onto a filesystem path.
    pub fn resolve(&self, url: &str) -> PathBuf {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

fn decode(path: &Path) -> BackgroundResult<BackgroundImage> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if !matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "webp") {
        return Err(BackgroundError::UnsupportedFormat(path.display().to_string()));
    }

    let data = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => BackgroundError::NotFound(path.display().to_string()),
        _ => BackgroundError::Io(e.to_string()),
    })?;

    // Decode to get dimensions
    let decoded = image::load_from_memory(&data).map_err(|e| match e {
        image::ImageError::Unsupported(_) => BackgroundError::UnsupportedFormat(e.to_string()),
        _ => BackgroundError::Decode(e.to_string()),
    })?;
    Ok(BackgroundImage::new(decoded.width(), decoded.height(), data))
}

impl BackgroundLoader for FileLoader {
    fn load(&self, url: &str) -> BoxFuture<'_, BackgroundResult<BackgroundImage>> {
        let path = self.resolve(url);
        Box::pin(async move { decode(&path) })
    }
}
