//! Background image state and the loader abstraction.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Background loading errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackgroundError {
    #[error("Image not found: {0}")]
    NotFound(String),
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("IO error: {0}")]
    Io(String),
}

pub type BackgroundResult<T> = Result<T, BackgroundError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A loaded background image.
///
/// The encoded bytes are shared, so cloning the handle is cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundImage {
    pub width: u32,
    pub height: u32,
    data: Arc<[u8]>,
}

impl BackgroundImage {
    pub fn new(width: u32, height: u32, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            width,
            height,
            data: data.into(),
        }
    }

    /// Encoded image bytes as handed over by the loader.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Progress of the most recent load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Empty,
    Loading,
    Ready,
    Failed,
}

/// What happened when a load result was handed back.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Ready,
    Failed(BackgroundError),
    /// The result was for a URL that has since been replaced or cleared.
    Stale,
}

/// The board's background: the requested URL and the last image that loaded.
#[derive(Debug, Clone, Default)]
pub struct Background {
    url: Option<String>,
    image: Option<BackgroundImage>,
    state: LoadState,
}

impl Background {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn image(&self) -> Option<&BackgroundImage> {
        self.image.as_ref()
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Request a new background. Returns the URL the host should load, or
    /// `None` if the input was blank and the background was cleared instead.
    pub fn request(&mut self, url: &str) -> Option<String> {
        let url = url.trim();
        if url.is_empty() {
            self.clear();
            return None;
        }
        log::debug!("Loading background {url}");
        self.url = Some(url.to_string());
        self.state = LoadState::Loading;
        Some(url.to_string())
    }

    /// Hand back the result of loading `url`.
    ///
    /// A failure keeps whatever image was shown before.
    pub fn complete(&mut self, url: &str, result: BackgroundResult<BackgroundImage>) -> LoadOutcome {
        if self.url.as_deref() != Some(url) || self.state != LoadState::Loading {
            log::debug!("Discarding stale background result for {url}");
            return LoadOutcome::Stale;
        }
        match result {
            Ok(image) => {
                log::info!("Background loaded: {url} ({}x{})", image.width, image.height);
                self.image = Some(image);
                self.state = LoadState::Ready;
                LoadOutcome::Ready
            }
            Err(err) => {
                log::warn!("Background load failed for {url}: {err}");
                self.state = LoadState::Failed;
                LoadOutcome::Failed(err)
            }
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Source of background images.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait BackgroundLoader: Send + Sync {
    fn load(&self, url: &str) -> BoxFuture<'_, BackgroundResult<BackgroundImage>>;
}

/// Source of background images (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait BackgroundLoader {
    fn load(&self, url: &str) -> BoxFuture<'_, BackgroundResult<BackgroundImage>>;
}

/// Loader backed by a map of preloaded images, for tests and embedding.
#[derive(Default)]
pub struct MemoryLoader {
    images: RwLock<HashMap<String, BackgroundImage>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: impl Into<String>, image: BackgroundImage) {
        if let Ok(mut images) = self.images.write() {
            images.insert(url.into(), image);
        }
    }
}

impl BackgroundLoader for MemoryLoader {
    fn load(&self, url: &str) -> BoxFuture<'_, BackgroundResult<BackgroundImage>> {
        let url = url.to_string();
        Box::pin(async move {
            let images = self
                .images
                .read()
                .map_err(|e| BackgroundError::Io(format!("Lock error: {}", e)))?;
            images.get(&url).cloned().ok_or(BackgroundError::NotFound(url))
        })
    }
}
