//! Image sources and decoding.
//!
//! An [`ImageLoader`] turns an image element's source string into encoded
//! bytes; [`decode_pixmap`] turns those bytes into a premultiplied pixmap
//! ready to paint. Decoding is CPU-bound and runs on tokio's blocking pool.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tiny_skia::{IntSize, Pixmap};

use crate::error::{RenderError, Result};

/// Resolves image source strings to encoded image bytes.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn fetch(&self, source: &str) -> Result<Vec<u8>>;
}

/// Loads `data:` URLs, `file://` URLs and plain paths.
///
/// Relative paths are resolved against the base directory, if one is set.
#[derive(Debug, Clone, Default)]
pub struct FsImageLoader {
    base_dir: Option<PathBuf>,
}

impl FsImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[async_trait]
impl ImageLoader for FsImageLoader {
    async fn fetch(&self, source: &str) -> Result<Vec<u8>> {
        if source.starts_with("data:") {
            return decode_data_url(source);
        }
        if source.starts_with("http://") || source.starts_with("https://") {
            return Err(RenderError::load(source, "remote sources are not supported"));
        }
        let path = self.resolve(source.strip_prefix("file://").unwrap_or(source));
        tokio::fs::read(&path)
            .await
            .map_err(|e| RenderError::load(source, e.to_string()))
    }
}

/// Serves images from memory; anything else fails as missing.
#[derive(Debug, Clone, Default)]
pub struct MemoryImageLoader {
    images: HashMap<String, Arc<Vec<u8>>>,
}

impl MemoryImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, source: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.images.insert(source.into(), Arc::new(bytes));
        self
    }
}

#[async_trait]
impl ImageLoader for MemoryImageLoader {
    async fn fetch(&self, source: &str) -> Result<Vec<u8>> {
        if source.starts_with("data:") {
            return decode_data_url(source);
        }
        self.images
            .get(source)
            .map(|bytes| bytes.as_ref().clone())
            .ok_or_else(|| RenderError::load(source, "not found"))
    }
}

/// Decodes the payload of a base64 `data:` URL.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::load(url, "not a data URL"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| RenderError::load(url, "missing ',' separator"))?;
    if !header.ends_with(";base64") {
        return Err(RenderError::load(url, "only base64 data URLs are supported"));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|e| RenderError::load(url, e.to_string()))
}

/// Decodes encoded image bytes into a premultiplied RGBA pixmap.
pub fn decode_pixmap(reference: &str, bytes: &[u8]) -> Result<Pixmap> {
    let rgba = image::load_from_memory(bytes)
        .map_err(|e| RenderError::decode(reference, e.to_string()))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    let size = IntSize::from_wh(width, height)
        .ok_or_else(|| RenderError::decode(reference, "image has no pixels"))?;

    let mut data = rgba.into_raw();
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a < 255 {
            px[0] = (px[0] as u16 * a / 255) as u8;
            px[1] = (px[1] as u16 * a / 255) as u8;
            px[2] = (px[2] as u16 * a / 255) as u8;
        }
    }
    Pixmap::from_vec(data, size).ok_or_else(|| RenderError::decode(reference, "invalid pixel buffer"))
}

/// Fetches and decodes one source. Decoding runs on the blocking pool.
pub async fn load_pixmap(loader: &dyn ImageLoader, source: &str) -> Result<Pixmap> {
    let bytes = loader.fetch(source).await?;
    let reference = source.to_string();
    tokio::task::spawn_blocking(move || decode_pixmap(&reference, &bytes))
        .await
        .map_err(|e| RenderError::decode(source, e.to_string()))?
}
