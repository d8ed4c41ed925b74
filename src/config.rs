use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Main application configuration
///
/// Holds no API key. The key lives in memory only and comes from
/// `--api-key`, `GEMINI_API_KEY`, or the `/key` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gemini model identifier
    pub model: String,

    /// Root of the Gemini REST API
    pub base_url: String,

    /// Persona selected at startup
    pub default_persona: String,

    /// UI preferences
    pub ui: UiConfig,

    /// Tragedian home directory
    #[serde(skip)]
    pub home: PathBuf,
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub show_timestamps: bool,
    /// Height the composer may grow to before it scrolls
    pub max_composer_lines: u16,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_timestamps: true,
            max_composer_lines: 6,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_persona: "Hamlet".to_string(),
            ui: UiConfig::default(),
            home: Self::default_home(),
        }
    }
}

impl Config {
    fn default_home() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tragedian")
    }

    /// Load `~/.tragedian/config.toml`, falling back to defaults
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir()
            .context("Could not find home directory")?
            .join(".tragedian");
        Self::load_from(&home)
    }

    /// Load `config.toml` from the given home directory
    pub fn load_from(home: &Path) -> Result<Self> {
        let config_path = home.join("config.toml");

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?
        } else {
            Config::default()
        };

        config.home = home.to_path_buf();
        Ok(config)
    }

    /// Where interactive sessions write their log
    pub fn log_path(&self) -> PathBuf {
        self.home.join("tragedian.log")
    }

    pub fn ensure_home(&self) -> Result<()> {
        fs::create_dir_all(&self.home)
            .with_context(|| format!("Failed to create {}", self.home.display()))
    }
}
