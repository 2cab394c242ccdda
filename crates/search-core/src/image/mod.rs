//! Image references produced by search pages and the decoded images
//! produced by the image loader.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::ids::ImageId;

/// Reference to one image in a search result.
///
/// Two references are equal iff their id and source URL match. The title is
/// display data only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRef {
    pub id: ImageId,
    pub source_url: Url,
    pub title: Option<String>,
}

impl ImageRef {
    pub fn new(source_url: Url) -> Self {
        Self {
            id: ImageId::new(),
            source_url,
            title: None,
        }
    }

    pub fn with_id(id: ImageId, source_url: Url) -> Self {
        Self {
            id,
            source_url,
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl PartialEq for ImageRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.source_url == other.source_url
    }
}

impl Eq for ImageRef {}

/// Decoded image, ready for display.
///
/// 解码后的图片（RGBA8 像素）。
#[derive(Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 pixels, `width * height * 4` bytes.
    pub rgba: Bytes,
}

impl LoadedImage {
    pub fn new(width: u32, height: u32, rgba: impl Into<Bytes>) -> Self {
        Self {
            width,
            height,
            rgba: rgba.into(),
        }
    }
}

impl std::fmt::Debug for LoadedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("rgba_len", &self.rgba.len())
            .finish()
    }
}
