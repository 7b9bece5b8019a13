//! Integration tests for config

use rootstrap_config::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to ensure env var tests don't run concurrently
static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

fn clear_env() {
    for var in [
        constants::ENV_ROOT,
        constants::ENV_PACMAN,
        constants::ENV_KEYRINGS,
        constants::ENV_LOCALE,
        constants::ENV_IDLE_TIMEOUT,
        constants::ENV_TOLERATE_TRY_FAILURES,
    ] {
        std::env::remove_var(var);
    }
}

#[test]
fn defaults_match_a_stock_install() {
    let config = Config::default();
    assert_eq!(config.root(), Path::new("/mnt"));
    assert_eq!(config.pacman.program, "pacman");
    assert_eq!(config.pacman.key_program, "pacman-key");
    assert_eq!(config.pacman.chroot_program, "chroot");
    assert_eq!(config.cache_dir(), PathBuf::from("/mnt/var/cache/pacman/pkg"));
    assert_eq!(config.db_path(), PathBuf::from("/mnt/var/lib/pacman"));
    assert_eq!(
        config.pacman.archive_suffixes,
        vec![".pkg.tar.xz".to_string(), ".pkg.tar.zst".to_string()]
    );
    assert_eq!(config.pacman.locale, "C");
    assert!(config.pacman.keyrings.is_empty());
    assert_eq!(config.idle_timeout(), None);
    assert!(config.runner.tolerate_try_failures);
}

#[tokio::test]
async fn load_config_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(
        temp_file,
        r#"
[target]
root = "/target"

[pacman]
keyrings = ["archlinux", "archlinuxarm"]
archive_suffixes = [".pkg.tar.zst"]

[runner]
idle_timeout_secs = 600
tolerate_try_failures = false
        "#
    )
    .unwrap();

    let config = Config::load_from_file(temp_file.path()).await.unwrap();
    assert_eq!(config.root(), Path::new("/target"));
    assert_eq!(config.pacman.keyrings, vec!["archlinux", "archlinuxarm"]);
    assert_eq!(config.pacman.archive_suffixes, vec![".pkg.tar.zst"]);
    // untouched keys keep their defaults
    assert_eq!(config.pacman.program, "pacman");
    assert_eq!(config.db_path(), PathBuf::from("/target/var/lib/pacman"));
    assert_eq!(config.runner.idle_timeout_secs, Some(600));
    assert!(!config.runner.tolerate_try_failures);
}

#[tokio::test]
async fn missing_file_is_not_found() {
    let err = Config::load_from_file(Path::new("/nonexistent/rootstrap.toml"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found"), "{err}");
}

#[tokio::test]
async fn malformed_toml_is_a_parse_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "[target\nroot = ").unwrap();
    assert!(Config::load_from_file(temp_file.path()).await.is_err());
}

#[tokio::test]
async fn empty_suffix_list_is_rejected() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "[pacman]\narchive_suffixes = []").unwrap();
    assert!(Config::load_from_file(temp_file.path()).await.is_err());
}

#[tokio::test]
async fn load_or_default_prefers_explicit_path() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "[target]\nroot = \"/explicit\"").unwrap();
    let config = Config::load_or_default(Some(temp_file.path())).await.unwrap();
    assert_eq!(config.root(), Path::new("/explicit"));
}

#[test]
fn merge_env_overrides_file_values() {
    let _guard = ENV_TEST_MUTEX.lock().unwrap();
    clear_env();

    std::env::set_var(constants::ENV_ROOT, "/srv/root");
    std::env::set_var(constants::ENV_KEYRINGS, "archlinux, ,manjaro");
    std::env::set_var(constants::ENV_IDLE_TIMEOUT, "30");
    std::env::set_var(constants::ENV_TOLERATE_TRY_FAILURES, "no");

    let mut config = Config::default();
    config.merge_env().unwrap();

    assert_eq!(config.root(), Path::new("/srv/root"));
    assert_eq!(config.pacman.keyrings, vec!["archlinux", "manjaro"]);
    assert_eq!(config.idle_timeout(), Some(std::time::Duration::from_secs(30)));
    assert!(!config.runner.tolerate_try_failures);

    clear_env();
}

#[test]
fn zero_idle_timeout_in_env_disables_watchdog() {
    let _guard = ENV_TEST_MUTEX.lock().unwrap();
    clear_env();

    std::env::set_var(constants::ENV_IDLE_TIMEOUT, "0");
    let mut config = Config::default();
    config.runner.idle_timeout_secs = Some(10);
    config.merge_env().unwrap();
    assert_eq!(config.idle_timeout(), None);

    clear_env();
}

#[test]
fn invalid_env_value() {
    let _guard = ENV_TEST_MUTEX.lock().unwrap();
    clear_env();

    std::env::set_var(constants::ENV_IDLE_TIMEOUT, "soon");
    let mut config = Config::default();
    assert!(config.merge_env().is_err());
    clear_env();

    std::env::set_var(constants::ENV_TOLERATE_TRY_FAILURES, "maybe");
    let mut config = Config::default();
    assert!(config.merge_env().is_err());

    clear_env();
}
