//! Configuration loading and service endpoint resolution

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Compiled default analysis service endpoint.
pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5000";

/// Environment variable override for the service endpoint.
pub const SERVICE_URL_ENV: &str = "SGA_SERVICE_URL";

/// Optional TOML configuration file contents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub service_url: Option<String>,
}

/// Analysis service endpoint resolution, priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable (`SGA_SERVICE_URL`)
/// 3. TOML config file (`<config dir>/sga/config.toml`)
/// 4. Compiled default (fallback)
///
/// A missing or unreadable config file is never an error; resolution falls
/// through to the next tier.
pub fn resolve_service_url(cli_arg: Option<&str>) -> String {
    // Priority 1: command-line argument
    if let Some(url) = cli_arg {
        return normalize_url(url);
    }

    // Priority 2: environment variable
    if let Ok(url) = std::env::var(SERVICE_URL_ENV) {
        if !url.is_empty() {
            return normalize_url(&url);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = config_file_path() {
        if let Some(config) = load_toml_config(&path) {
            if let Some(url) = config.service_url {
                return normalize_url(&url);
            }
        }
    }

    // Priority 4: compiled default
    DEFAULT_SERVICE_URL.to_string()
}

/// Load and parse a TOML config file. Returns `None` when the file is
/// missing or malformed (logged at debug level, never fatal).
pub fn load_toml_config(path: &Path) -> Option<TomlConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!("No config file at {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str::<TomlConfig>(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Ignoring malformed config {}: {}", path.display(), e);
            None
        }
    }
}

/// Default configuration file path for the platform
fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sga").join("config.toml"))
}

/// Trailing slashes would double up when endpoint paths are appended.
fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
