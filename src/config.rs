//! Configuration management for Trazo
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//! Precedence, lowest to highest: built-in defaults, the YAML file,
//! `TRAZO_*` environment variables, command-line flags.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ApiError, Result};

/// Main configuration structure for Trazo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server connection settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Terminal output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Server connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the Trazo API, endpoint paths are joined onto it
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Terminal output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Rendering format for list and detail output
    #[serde(default)]
    pub format: OutputFormat,

    /// Whether status tags use terminal colors
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_color() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: default_color(),
        }
    }
}

/// Output rendering format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Table,
    /// Machine-readable pretty-printed JSON
    Json,
}

impl Config {
    /// Load configuration with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Explicit configuration file path, when given
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    /// A missing file is not an error; defaults apply.
    pub fn load(path: Option<&str>, cli: &crate::cli::Cli) -> Result<Self> {
        let path = match path {
            Some(path) => PathBuf::from(path),
            None => match std::env::var("TRAZO_CONFIG") {
                Ok(env_path) => PathBuf::from(env_path),
                Err(_) => Self::default_path()?,
            },
        };

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);
        config.validate()?;

        Ok(config)
    }

    /// The default configuration file location for this platform.
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = directories::ProjectDirs::from("com", "trazo", "trazo")
            .ok_or_else(|| ApiError::Config("could not determine config directory".to_string()))?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ApiError::Config(format!("failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ApiError::Config(format!("failed to parse config: {}", e)))
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("TRAZO_SERVER_URL") {
            self.server.base_url = base_url;
        }

        if let Ok(format) = std::env::var("TRAZO_FORMAT") {
            match format.to_lowercase().as_str() {
                "table" => self.output.format = OutputFormat::Table,
                "json" => self.output.format = OutputFormat::Json,
                other => tracing::warn!("Invalid TRAZO_FORMAT: {}", other),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(server_url) = &cli.server_url {
            self.server.base_url = server_url.clone();
        }
        if let Some(format) = cli.format {
            self.output.format = format;
        }
        if cli.no_color {
            self.output.color = false;
        }
    }

    /// Check that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] when the server URL does not
    /// parse as an absolute URL.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.server.base_url)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {}", self.server.base_url, e)))?;
        if url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(self.server.base_url.clone()));
        }
        Ok(())
    }

    /// Write this configuration to the given path, creating parent
    /// directories as needed. Used by `trazo config init`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ApiError::Config(format!("failed to create config dir: {}", e)))?;
        }
        let contents = serde_yaml::to_string(self)
            .map_err(|e| ApiError::Config(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)
            .map_err(|e| ApiError::Config(format!("failed to write config file: {}", e)))?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            output: OutputConfig::default(),
        }
    }
}
