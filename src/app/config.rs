//! Configuration for the pager

use serde::{Deserialize, Serialize};

use crate::core::LoadOptions;
use crate::frontend::RendererConfig;

/// Pager configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Letter that quits, both pressed alone and with Ctrl
    pub quit_key: char,
    /// Raw-mode read timeout in tenths of a second
    pub read_timeout_ds: u8,
    /// Message shown when the document is empty
    pub placeholder: String,
    /// Glyph marking rows past the end of the document
    pub filler: char,
    /// Cut lines at the terminal width
    pub truncate_lines: bool,
    /// Document preprocessing
    pub load: LoadOptions,
}

impl Default for Config {
    fn default() -> Self {
        let renderer = RendererConfig::default();
        Self {
            quit_key: 'q',
            read_timeout_ds: 1,
            placeholder: renderer.placeholder,
            filler: renderer.filler,
            truncate_lines: renderer.truncate_lines,
            load: LoadOptions::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from default location or return default config
    pub fn load_or_default() -> Self {
        // Try to load from ~/.config/page/config.json
        if let Some(config_dir) = dirs_config_path() {
            let config_path = config_dir.join("config.json");
            if config_path.exists() {
                match Self::load(&config_path) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!(
                        path = %config_path.display(),
                        "ignoring unreadable config: {}",
                        e
                    ),
                }
            }
        }
        Self::default()
    }

    /// The quit key as a byte; falls back to `q` for non-ASCII letters
    pub fn quit_byte(&self) -> u8 {
        if self.quit_key.is_ascii_alphabetic() {
            self.quit_key as u8
        } else {
            b'q'
        }
    }

    /// Renderer settings derived from this configuration
    pub fn renderer_config(&self) -> RendererConfig {
        RendererConfig {
            placeholder: self.placeholder.clone(),
            filler: self.filler,
            truncate_lines: self.truncate_lines,
        }
    }
}

/// Get the configuration directory path
fn dirs_config_path() -> Option<std::path::PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| std::path::PathBuf::from(home).join(".config").join("page"))
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
