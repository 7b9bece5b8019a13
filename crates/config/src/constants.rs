//! Built-in defaults and environment variable names

pub const DEFAULT_ROOT: &str = "/mnt";

pub const PACMAN: &str = "pacman";
pub const PACMAN_KEY: &str = "pacman-key";
pub const CHROOT: &str = "chroot";

/// Relative to the target root
pub const CACHE_DIR: &str = "var/cache/pacman/pkg";
/// Relative to the target root
pub const DB_PATH: &str = "var/lib/pacman";

pub const ARCHIVE_SUFFIXES: &[&str] = &[".pkg.tar.xz", ".pkg.tar.zst"];

pub const LOCALE: &str = "C";

pub const ENV_ROOT: &str = "ROOTSTRAP_ROOT";
pub const ENV_PACMAN: &str = "ROOTSTRAP_PACMAN";
pub const ENV_KEYRINGS: &str = "ROOTSTRAP_KEYRINGS";
pub const ENV_LOCALE: &str = "ROOTSTRAP_LOCALE";
pub const ENV_IDLE_TIMEOUT: &str = "ROOTSTRAP_IDLE_TIMEOUT";
pub const ENV_TOLERATE_TRY_FAILURES: &str = "ROOTSTRAP_TOLERATE_TRY_FAILURES";

/// Where `--debug` writes JSON logs
pub const LOGS_DIR: &str = "/var/log/rootstrap";
