//! Search query construction and provider parameter mapping.

use serde::{Deserialize, Serialize};

use crate::config::{ProviderConfig, SearchConfig, DEFAULT_PAGE_SIZE};

/// File type filter sent to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpg,
    Gif,
    Webp,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

/// Image size filter sent to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    Icon,
    Small,
    Medium,
    Large,
    Xlarge,
    Xxlarge,
    Huge,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Icon => "icon",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Xlarge => "xlarge",
            Self::Xxlarge => "xxlarge",
            Self::Huge => "huge",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "icon" => Some(Self::Icon),
            "small" => Some(Self::Small),
            "medium" => Some(Self::Medium),
            "large" => Some(Self::Large),
            "xlarge" => Some(Self::Xlarge),
            "xxlarge" => Some(Self::Xxlarge),
            "huge" => Some(Self::Huge),
            _ => None,
        }
    }
}

mod keys {
    pub const SEARCH_TEXT: &str = "q";
    pub const IMAGE_FORMAT: &str = "fileType";
    pub const IMAGE_SIZE: &str = "imgSize";
    pub const LIMIT: &str = "num";
    pub const POSITION: &str = "start";
    pub const SEARCH_TYPE: &str = "searchType";
    pub const API_KEY: &str = "key";
    pub const ENGINE_ID: &str = "cx";
}

/// Normalized parameters for one page request.
///
/// Built fresh for every request by [`QueryBuilder`]; never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    search_text: Option<String>,
    page_size: u32,
    page_cursor: u32,
}

impl SearchQuery {
    /// Trimmed search text, `None` when the user entered nothing.
    pub fn search_text(&self) -> Option<&str> {
        self.search_text.as_deref()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// 1-based start position of the requested slice.
    pub fn page_cursor(&self) -> u32 {
        self.page_cursor
    }

    /// Map the query onto the provider's wire parameter names.
    ///
    /// An absent search text omits `q` entirely; the provider then answers
    /// with its generic result set.
    pub fn to_params(&self, provider: &ProviderConfig) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(8);

        if let Some(text) = &self.search_text {
            params.push((keys::SEARCH_TEXT.to_string(), text.clone()));
        }

        params.push((
            keys::IMAGE_FORMAT.to_string(),
            provider.image_format.as_str().to_string(),
        ));
        params.push((
            keys::IMAGE_SIZE.to_string(),
            provider.image_size.as_str().to_string(),
        ));
        params.push((keys::LIMIT.to_string(), self.page_size.to_string()));
        params.push((keys::POSITION.to_string(), self.page_cursor.to_string()));
        params.push((keys::SEARCH_TYPE.to_string(), "image".to_string()));
        params.push((keys::API_KEY.to_string(), provider.api_key.clone()));
        params.push((keys::ENGINE_ID.to_string(), provider.engine_id.clone()));

        params
    }
}

/// Turns raw user input into a [`SearchQuery`]. Holds no state besides the
/// configured page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryBuilder {
    page_size: u32,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl QueryBuilder {
    /// A zero page size falls back to the default.
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: if page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.page_size)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Build a query for `page_cursor`.
    ///
    /// `page_cursor` must be at least 1; a zero cursor is clamped to the first page.
    pub fn build(&self, search_text: Option<&str>, page_cursor: u32) -> SearchQuery {
        debug_assert!(page_cursor >= 1, "page cursor is 1-based");

        let search_text = search_text
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);

        SearchQuery {
            search_text,
            page_size: self.page_size,
            page_cursor: page_cursor.max(1),
        }
    }
}
