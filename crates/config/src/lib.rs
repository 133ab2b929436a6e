//! Configuration loading for the Lost & Found tools
//!
//! Everything lives under the shared config directory (~/.config/lostfound/).
//! [`AppConfig`] is read from `lostfound.json` in that directory.
//!
//! Call [`init`] at application startup to bootstrap the config directory.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory name under the platform config dir
const APP_DIR: &str = "lostfound";

/// Application config filename
pub const APP_CONFIG_FILE: &str = "lostfound.json";

/// Environment variable overriding [`AppConfig::vision_api_key`]
pub const VISION_API_KEY_ENV: &str = "LOSTFOUND_VISION_API_KEY";

/// Initialize the config directory.
///
/// Creates ~/.config/lostfound/ if it doesn't exist.
pub fn init() -> Result<PathBuf> {
    ensure_config_dir()
}

/// Get the config directory (~/.config/lostfound/)
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_DIR))
}

/// Get the default data directory (~/.local/share/lostfound/ on Linux)
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join(APP_DIR))
}

/// Get the path to a file within the config directory
pub fn config_path(filename: &str) -> Option<PathBuf> {
    config_dir().map(|p| p.join(filename))
}

/// Load and parse a JSON config file from the config directory
pub fn load_json<T: DeserializeOwned>(filename: &str) -> Result<T> {
    let path = config_path(filename).context("Could not determine config directory")?;
    load_json_file(&path)
}

/// Load and parse a JSON file from an arbitrary path
pub fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Check if a config file exists in the config directory
pub fn config_exists(filename: &str) -> bool {
    config_path(filename).is_some_and(|p| p.exists())
}

/// Ensure the config directory exists
pub fn ensure_config_dir() -> Result<PathBuf> {
    let dir = config_dir().context("Could not determine config directory")?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
    Ok(dir)
}

/// Save a value as JSON to a config file in the config directory
pub fn save_json<T: Serialize>(filename: &str, value: &T) -> Result<()> {
    let dir = ensure_config_dir()?;
    save_json_file(&dir.join(filename), value)
}

/// Save a value as pretty JSON to an arbitrary path
pub fn save_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(())
}

/// Which persistence substrate backs the message store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Single SQLite file in the data directory
    #[default]
    Sqlite,
    /// One JSON file per key in the data directory
    File,
    /// Nothing survives the process
    Memory,
}

/// Application settings (`lostfound.json`)
///
/// Every field is optional so a missing or partial file still loads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the message store keeps its data (defaults to [`data_dir`])
    pub data_dir: Option<PathBuf>,
    pub backend: Backend,
    /// API key for the image-understanding service
    pub vision_api_key: Option<String>,
    /// Override for the image-understanding endpoint (tests, proxies)
    pub vision_endpoint: Option<String>,
}

impl AppConfig {
    /// Load `lostfound.json` if present, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = if config_exists(APP_CONFIG_FILE) {
            load_json::<Self>(APP_CONFIG_FILE)?
        } else {
            Self::default()
        };
        cfg.apply_env();
        Ok(cfg)
    }

    /// Load from an explicit path, then apply environment overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut cfg: Self = load_json_file(path)?;
        cfg.apply_env();
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(VISION_API_KEY_ENV)
            && !key.is_empty()
        {
            self.vision_api_key = Some(key);
        }
    }

    /// Resolved data directory
    pub fn resolved_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => data_dir().context("Could not determine data directory"),
        }
    }
}
