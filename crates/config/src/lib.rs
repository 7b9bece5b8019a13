#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for rootstrap
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/rootstrap/config.toml)
//! - Environment variables (`ROOTSTRAP_*`)
//! - CLI flags (applied by the binary)

pub mod constants;
pub mod core;

pub use crate::core::{PacmanConfig, RunnerConfig, TargetConfig};

use rootstrap_errors::{ConfigError, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub pacman: PacmanConfig,

    #[serde(default)]
    pub runner: RunnerConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("rootstrap").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML,
    /// or fails validation.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Ok(root) = std::env::var(constants::ENV_ROOT) {
            if root.is_empty() {
                return Err(invalid(constants::ENV_ROOT, root));
            }
            self.target.root = PathBuf::from(root);
        }

        if let Ok(program) = std::env::var(constants::ENV_PACMAN) {
            if program.trim().is_empty() {
                return Err(invalid(constants::ENV_PACMAN, program));
            }
            self.pacman.program = program;
        }

        // Comma-separated, blanks dropped
        if let Ok(keyrings) = std::env::var(constants::ENV_KEYRINGS) {
            self.pacman.keyrings = keyrings
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(ToString::to_string)
                .collect();
        }

        if let Ok(locale) = std::env::var(constants::ENV_LOCALE) {
            self.pacman.locale = locale;
        }

        if let Ok(timeout) = std::env::var(constants::ENV_IDLE_TIMEOUT) {
            self.runner.idle_timeout_secs = match timeout.as_str() {
                "" | "0" | "none" => None,
                value => Some(
                    value
                        .parse()
                        .map_err(|_| invalid(constants::ENV_IDLE_TIMEOUT, timeout.clone()))?,
                ),
            };
        }

        if let Ok(tolerate) = std::env::var(constants::ENV_TOLERATE_TRY_FAILURES) {
            self.runner.tolerate_try_failures = match tolerate.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => return Err(invalid(constants::ENV_TOLERATE_TRY_FAILURES, tolerate)),
            };
        }

        self.validate()
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for settings no run could work with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.pacman.archive_suffixes.is_empty() {
            return Err(ConfigError::Invalid {
                message: "pacman.archive_suffixes must not be empty".to_string(),
            }
            .into());
        }
        if self.runner.idle_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid {
                message: "runner.idle_timeout_secs must be positive; omit it to disable"
                    .to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Target root mount point
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.target.root
    }

    /// Absolute package cache inside the target
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.target.root.join(&self.pacman.cache_dir)
    }

    /// Absolute sync database path inside the target
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.target.root.join(&self.pacman.db_path)
    }

    #[must_use]
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.runner.idle_timeout_secs.map(Duration::from_secs)
    }
}

fn invalid(field: &str, value: String) -> Error {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value,
    }
    .into()
}
