//! Configuration loader for grepchat.
//!
//! Reads `config.toml` from the data directory (`~/.grepchat/` by default)
//! and deserializes it into [`GrepchatConfig`]. Falls back to defaults when
//! the file is missing or malformed.

use std::path::{Path, PathBuf};

use grepchat_types::config::GrepchatConfig;

pub const CONFIG_FILE: &str = "config.toml";

/// Resolve the data directory.
///
/// Priority:
/// 1. `GREPCHAT_DATA_DIR` environment variable
/// 2. `~/.grepchat`
/// 3. `./.grepchat` when no home directory is known
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("GREPCHAT_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".grepchat");
    }

    PathBuf::from(".grepchat")
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: defaults, logged at debug.
/// - Unreadable or unparsable file: defaults, logged at warn.
pub async fn load_config(data_dir: &Path) -> GrepchatConfig {
    let path = config_path(data_dir);

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", path.display());
            return GrepchatConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return GrepchatConfig::default();
        }
    };

    match toml::from_str::<GrepchatConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            GrepchatConfig::default()
        }
    }
}
