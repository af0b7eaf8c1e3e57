//! TOML configuration loading. Missing files fall back to defaults;
//! missing fields use serde defaults, so a partial config works.

use std::path::{Path, PathBuf};

use medya_common::ConfigError;
use medya_tabs::EngineConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
}

/// Load config from a specific TOML file path.
pub fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|_| ConfigError::FileNotFound(path.to_path_buf()))?;
    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    info!("loaded config from {}", path.display());
    Ok(config)
}

/// `<config dir>/medya/config.toml` (e.g. `~/.config/medya/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("medya").join("config.toml"))
}

/// Load config from the platform default path; an absent file just means
/// defaults.
pub fn load_default() -> Result<AppConfig, ConfigError> {
    match default_config_path() {
        Some(path) if path.exists() => load_from_path(&path),
        _ => Ok(AppConfig::default()),
    }
}
