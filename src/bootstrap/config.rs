//! # Configuration Loader / 配置加载器
//!
//! Reads the TOML file and maps it onto [`SearchConfig`]. Missing keys keep
//! their defaults; credentials may also come from the environment (or a
//! `.env` file loaded by `main`), which wins over the file.

use anyhow::Context;
use std::path::{Path, PathBuf};
use search_core::config::SearchConfig;
use tracing::{debug, info};

pub const ENV_API_KEY: &str = "IMAGESEARCH_API_KEY";
pub const ENV_ENGINE_ID: &str = "IMAGESEARCH_ENGINE_ID";
pub const ENV_ENDPOINT: &str = "IMAGESEARCH_ENDPOINT";

/// Load configuration from a TOML file
/// 从 TOML 文件加载配置
///
/// # Errors / 错误
///
/// Returns error if the file cannot be read or is not valid TOML.
pub fn load_config(config_path: PathBuf) -> anyhow::Result<SearchConfig> {
    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    Ok(SearchConfig::from_toml(&toml_value))
}

/// `<config dir>/imagesearch/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("imagesearch").join("config.toml"))
}

/// Pick the configuration source.
///
/// An explicit path must exist. Otherwise the default location is used when
/// present, and built-in defaults when not.
pub fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<SearchConfig> {
    if let Some(path) = explicit {
        info!(path = %path.display(), "loading config");
        return load_config(path.to_path_buf());
    }

    match default_config_path() {
        Some(path) if path.is_file() => {
            info!(path = %path.display(), "loading config");
            load_config(path)
        }
        _ => {
            debug!("no config file; using defaults");
            Ok(SearchConfig::default())
        }
    }
}

/// Overlay provider settings from the environment.
///
/// `lookup` is `std::env::var(..).ok()` in production. Empty values are
/// ignored.
pub fn apply_env_overrides<F>(config: &mut SearchConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(api_key) = value(ENV_API_KEY) {
        config.provider.api_key = api_key;
    }
    if let Some(engine_id) = value(ENV_ENGINE_ID) {
        config.provider.engine_id = engine_id;
    }
    if let Some(endpoint) = value(ENV_ENDPOINT) {
        config.provider.endpoint = endpoint;
    }
}
