// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 PhimHub contributors

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub servers: Vec<ServerConfig>,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: Option<String>,
    pub url: String,
}

impl ServerConfig {
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.url.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub command: String,
    pub args: Vec<String>,
    /// Tried in order when `command` is not installed.
    #[serde(default = "default_fallbacks")]
    pub fallbacks: Vec<String>,
}

fn default_fallbacks() -> Vec<String> {
    vec!["mpv".to_string(), "vlc".to_string(), "ffplay".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub page_size: usize,
    pub search_debounce_ms: u64,
    /// Rows from the end of the loaded list at which the next page loads.
    pub scroll_sentinel_rows: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            command: "mpv".to_string(),
            args: vec!["--fs".to_string(), "--quiet".to_string()],
            fallbacks: default_fallbacks(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            search_debounce_ms: 300,
            scroll_sentinel_rows: 5,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            servers: vec![ServerConfig {
                name: Some("Example Server".to_string()),
                url: "https://phimhub.example.com".to_string(),
            }],
            player: PlayerConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("phimhub"))
    }

    pub fn ensure_config_dir() -> Result<PathBuf> {
        let dir = Self::config_dir()?;
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }
        Ok(dir)
    }

    pub fn default_path() -> PathBuf {
        Self::config_dir()
            .map(|p| p.join("config.toml"))
            .unwrap_or_else(|_| PathBuf::from("config.toml"))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Config {
        Self::load(&path).unwrap_or_else(|_| {
            eprintln!("Warning: Could not load config file, using defaults");
            Self::default()
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config to TOML")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }
}
