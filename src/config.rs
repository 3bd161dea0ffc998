//! Configuration loader plus strongly typed settings structures.
//!
//! Settings live in `~/.mansion-client/config.toml` (or `$MANSION_CLIENT_DIR`).
//! The embedded default is written there on first run; every field also has a
//! serde default so older or partial files keep loading.

use crate::core::menu::PendingNavigation;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// Embed default configuration file at compile time
const DEFAULT_CONFIG: &str = include_str!("../defaults/config.toml");

const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub menu: MenuConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Display name used when joining
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuConfig {
    /// Arrow keys while a command is in flight: "block" or "allow"
    #[serde(default)]
    pub navigation_while_pending: PendingNavigation,
    /// Echo each submitted command into the log as `> command`
    #[serde(default)]
    pub echo_commands: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
    #[serde(default = "default_show_icons")]
    pub show_icons: bool,
    /// Prefix log lines with their arrival time
    #[serde(default)]
    pub show_timestamps: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5007
}

fn default_buffer_size() -> usize {
    1000
}

fn default_poll_timeout_ms() -> u64 {
    16
}

fn default_show_icons() -> bool {
    true
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            name: None,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            poll_timeout_ms: default_poll_timeout_ms(),
            show_icons: default_show_icons(),
            show_timestamps: false,
        }
    }
}

impl Config {
    /// Load from the standard location, extracting the default file on first run
    pub fn load() -> Result<Self> {
        Self::load_from_dir(&Self::base_dir()?)
    }

    /// Load `config.toml` from `dir`, creating it from the embedded default if missing
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory {:?}", dir))?;
            fs::write(&path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write default config to {:?}", path))?;
            tracing::info!("Wrote default config to {:?}", path);
        }
        Self::load_from_path(&path)
    }

    /// Load config from a custom file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the base directory (~/.mansion-client/)
    /// Can be overridden with MANSION_CLIENT_DIR environment variable
    pub fn base_dir() -> Result<PathBuf> {
        if let Ok(custom_dir) = std::env::var("MANSION_CLIENT_DIR") {
            return Ok(PathBuf::from(custom_dir));
        }

        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".mansion-client"))
    }
}
