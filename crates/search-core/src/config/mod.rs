//! # Configuration DTO / 配置数据
//!
//! Plain data describing the search provider and the pagination tuning knobs.
//! `from_toml` maps whatever the file contains onto these fields; keys that are
//! missing or have the wrong type keep their default value.

use std::time::Duration;

use crate::search::query::{ImageFormat, ImageSize};

/// Default Google Custom Search endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// The provider caps `num` at 10 results per request.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

pub const DEFAULT_PREFETCH_DISTANCE: usize = 4;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Provider connection settings, sent with every search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub endpoint: String,
    /// Opaque credential, passed through as the `key` parameter.
    pub api_key: String,
    /// Opaque search engine id, passed through as the `cx` parameter.
    pub engine_id: String,
    pub image_format: ImageFormat,
    pub image_size: ImageSize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            engine_id: String::new(),
            image_format: ImageFormat::Png,
            image_size: ImageSize::Medium,
        }
    }
}

/// Application configuration DTO
/// 应用配置 DTO
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub provider: ProviderConfig,
    pub page_size: u32,
    /// Quiet period after the last search-text change before a reload runs.
    pub debounce: Duration,
    /// How close to the end of the list a visible item must be to trigger
    /// loading the next page.
    pub prefetch_distance: usize,
    pub request_timeout: Duration,
    /// Longest edge of a decoded thumbnail; larger images are downscaled.
    /// `None` keeps images at their original size.
    pub thumbnail_max_edge: Option<u32>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            prefetch_distance: DEFAULT_PREFETCH_DISTANCE,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            thumbnail_max_edge: None,
        }
    }
}

impl SearchConfig {
    /// Create SearchConfig from a TOML value
    /// 从 TOML 值创建 SearchConfig
    ///
    /// ```toml
    /// [provider]
    /// endpoint = "https://www.googleapis.com/customsearch/v1"
    /// api_key = "..."
    /// engine_id = "..."
    /// image_format = "png"
    /// image_size = "medium"
    ///
    /// [pagination]
    /// page_size = 10
    /// debounce_ms = 500
    /// prefetch_distance = 4
    ///
    /// [network]
    /// request_timeout_secs = 30
    ///
    /// [images]
    /// max_edge = 256
    /// ```
    pub fn from_toml(toml_value: &toml::Value) -> Self {
        let defaults = Self::default();
        let get_str = |section: &str, key: &str| {
            toml_value
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };
        let get_int = |section: &str, key: &str| {
            toml_value
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_integer())
        };

        let provider = ProviderConfig {
            endpoint: get_str("provider", "endpoint").unwrap_or(defaults.provider.endpoint),
            api_key: get_str("provider", "api_key").unwrap_or_default(),
            engine_id: get_str("provider", "engine_id").unwrap_or_default(),
            image_format: get_str("provider", "image_format")
                .and_then(|s| ImageFormat::parse(&s))
                .unwrap_or(defaults.provider.image_format),
            image_size: get_str("provider", "image_size")
                .and_then(|s| ImageSize::parse(&s))
                .unwrap_or(defaults.provider.image_size),
        };

        Self {
            provider,
            page_size: get_int("pagination", "page_size")
                .and_then(|v| u32::try_from(v).ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.page_size),
            debounce: get_int("pagination", "debounce_ms")
                .and_then(|v| u64::try_from(v).ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.debounce),
            prefetch_distance: get_int("pagination", "prefetch_distance")
                .and_then(|v| usize::try_from(v).ok())
                .unwrap_or(defaults.prefetch_distance),
            request_timeout: get_int("network", "request_timeout_secs")
                .and_then(|v| u64::try_from(v).ok())
                .filter(|v| *v > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            thumbnail_max_edge: get_int("images", "max_edge")
                .and_then(|v| u32::try_from(v).ok())
                .filter(|v| *v > 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_reads_all_sections() {
        let value: toml::Value = toml::from_str(
            r#"
            [provider]
            endpoint = "http://localhost:9000/search"
            api_key = "k"
            engine_id = "cx"
            image_format = "jpg"
            image_size = "large"

            [pagination]
            page_size = 5
            debounce_ms = 250
            prefetch_distance = 2

            [network]
            request_timeout_secs = 7

            [images]
            max_edge = 128
            "#,
        )
        .unwrap();

        let config = SearchConfig::from_toml(&value);
        assert_eq!(config.provider.endpoint, "http://localhost:9000/search");
        assert_eq!(config.provider.api_key, "k");
        assert_eq!(config.provider.engine_id, "cx");
        assert_eq!(config.provider.image_format, ImageFormat::Jpg);
        assert_eq!(config.provider.image_size, ImageSize::Large);
        assert_eq!(config.page_size, 5);
        assert_eq!(config.debounce, Duration::from_millis(250));
        assert_eq!(config.prefetch_distance, 2);
        assert_eq!(config.request_timeout, Duration::from_secs(7));
        assert_eq!(config.thumbnail_max_edge, Some(128));
    }

    #[test]
    fn test_from_toml_falls_back_to_defaults() {
        let value: toml::Value = toml::from_str(
            r#"
            [pagination]
            page_size = 0
            debounce_ms = "fast"

            [images]
            max_edge = 0
            "#,
        )
        .unwrap();

        let config = SearchConfig::from_toml(&value);
        assert_eq!(config, SearchConfig::default());
    }
}
