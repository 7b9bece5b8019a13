//! Configuration sections

use crate::constants;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The system being bootstrapped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Mount point of the target root filesystem
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

/// How pacman and its helpers are invoked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacmanConfig {
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default = "default_key_program")]
    pub key_program: String,
    #[serde(default = "default_chroot_program")]
    pub chroot_program: String,
    /// Package cache, relative to the target root
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    /// Sync database, relative to the target root
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Keyrings passed to `pacman-key --populate`
    #[serde(default)]
    pub keyrings: Vec<String>,
    /// Archive file endings recognised in download lines
    #[serde(default = "default_archive_suffixes")]
    pub archive_suffixes: Vec<String>,
    /// Forced into `LC_ALL` so output stays parseable
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for PacmanConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            key_program: default_key_program(),
            chroot_program: default_chroot_program(),
            cache_dir: default_cache_dir(),
            db_path: default_db_path(),
            keyrings: Vec::new(),
            archive_suffixes: default_archive_suffixes(),
            locale: default_locale(),
        }
    }
}

/// Batch sequencing behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Kill a batch whose child prints nothing for this long. Unset waits forever.
    #[serde(default)]
    pub idle_timeout_secs: Option<u64>,
    /// Let `try_install`/`try_remove` fail without aborting the plan
    #[serde(default = "default_tolerate_try_failures")]
    pub tolerate_try_failures: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: None,
            tolerate_try_failures: default_tolerate_try_failures(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(constants::DEFAULT_ROOT)
}

fn default_program() -> String {
    constants::PACMAN.to_string()
}

fn default_key_program() -> String {
    constants::PACMAN_KEY.to_string()
}

fn default_chroot_program() -> String {
    constants::CHROOT.to_string()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(constants::CACHE_DIR)
}

fn default_db_path() -> PathBuf {
    PathBuf::from(constants::DB_PATH)
}

fn default_archive_suffixes() -> Vec<String> {
    constants::ARCHIVE_SUFFIXES
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_locale() -> String {
    constants::LOCALE.to_string()
}

fn default_tolerate_try_failures() -> bool {
    true
}
