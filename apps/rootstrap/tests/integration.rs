//! Integration tests for the rootstrap CLI

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Command;

fn rootstrap() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rootstrap"));
    // Keep the caller's environment from leaking into the run
    for key in [
        "ROOTSTRAP_ROOT",
        "ROOTSTRAP_PACMAN",
        "ROOTSTRAP_KEYRINGS",
        "ROOTSTRAP_LOCALE",
        "ROOTSTRAP_IDLE_TIMEOUT",
        "ROOTSTRAP_TOLERATE_TRY_FAILURES",
        "RUST_LOG",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

fn write_executable(path: &Path, body: &str) {
    fs::write(path, body).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}

fn write_config(dir: &Path, pacman: &Path) -> std::path::PathBuf {
    let config = dir.join("config.toml");
    fs::write(
        &config,
        format!(
            "[target]\nroot = \"{}\"\n\n[pacman]\nprogram = \"{}\"\nchroot_program = \"true\"\n",
            dir.join("root").display(),
            pacman.display()
        ),
    )
    .unwrap();
    config
}

#[test]
fn test_cli_version() {
    let output = rootstrap()
        .arg("--version")
        .output()
        .expect("Failed to execute rootstrap");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rootstrap"));
}

#[test]
fn test_cli_help() {
    let output = rootstrap()
        .arg("--help")
        .output()
        .expect("Failed to execute rootstrap");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("run"));
    assert!(stdout.contains("classify"));
}

#[test]
fn test_cli_invalid_command() {
    let output = rootstrap()
        .arg("invalid-command")
        .output()
        .expect("Failed to execute rootstrap");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unrecognized subcommand"));
}

#[test]
fn test_run_requires_plan() {
    let output = rootstrap()
        .arg("run")
        .output()
        .expect("Failed to execute rootstrap");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--plan"));
}

#[test]
fn test_run_missing_plan_file() {
    let temp = tempfile::tempdir().unwrap();
    let config = write_config(temp.path(), Path::new("/bin/false"));

    let output = rootstrap()
        .args(["--color", "never", "--config"])
        .arg(&config)
        .args(["run", "--plan"])
        .arg(temp.path().join("missing.json"))
        .output()
        .expect("Failed to execute rootstrap");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error"));
}

#[test]
fn test_classify_json_trajectory() {
    let temp = tempfile::tempdir().unwrap();
    let log = temp.path().join("pacman.log");
    fs::write(
        &log,
        b"Packages (2) a b\n\
         downloading a.pkg.tar.zst...\n\
         downloading a.pkg.tar.zst...\n\
         downloading b.pkg.tar.zst...\n\
         installing a...\n\
         installing \xffgarbled...\n\
         installing b...\n\
         :: Running post-transaction hooks...\n",
    )
    .unwrap();
    let config = write_config(temp.path(), Path::new("/bin/false"));

    let output = rootstrap()
        .arg("--json")
        .arg("--config")
        .arg(&config)
        .arg("classify")
        .arg(&log)
        .output()
        .expect("Failed to execute rootstrap");

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["type"], "Replay");
    let data = &value["data"];
    assert_eq!(data["lines"], 8);
    assert_eq!(data["skipped"], 1);
    assert_eq!(data["state"]["downloaded"], 2);
    assert_eq!(data["state"]["installed"], 2);
    assert_eq!(data["state"]["progress"], 1.0);
}

#[test]
fn test_run_end_to_end_with_scripted_pacman() {
    let temp = tempfile::tempdir().unwrap();
    fs::create_dir_all(temp.path().join("root")).unwrap();

    let pacman = temp.path().join("pacman");
    write_executable(
        &pacman,
        "#!/bin/sh\n\
         echo 'Packages (1) base'\n\
         echo 'downloading base-3-1-any.pkg.tar.zst...'\n\
         echo 'installing base...'\n\
         exit 0\n",
    );
    let config = write_config(temp.path(), &pacman);

    let plan = temp.path().join("plan.json");
    fs::write(&plan, r#"{"install": [{"package": "base"}], "remove": []}"#).unwrap();

    let output = rootstrap()
        .arg("--json")
        .arg("--config")
        .arg(&config)
        .args(["run", "--plan"])
        .arg(&plan)
        .output()
        .expect("Failed to execute rootstrap");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["type"], "Run");
    let batches = value["data"]["batches"].as_array().unwrap();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0]["outcome"], "succeeded");
    assert_eq!(batches[1]["outcome"], "skipped");
}

#[test]
fn test_run_failure_exits_nonzero() {
    let temp = tempfile::tempdir().unwrap();
    fs::create_dir_all(temp.path().join("root")).unwrap();

    let pacman = temp.path().join("pacman");
    write_executable(&pacman, "#!/bin/sh\necho 'error: target not found: nope'\nexit 1\n");
    let config = write_config(temp.path(), &pacman);

    let plan = temp.path().join("plan.json");
    fs::write(&plan, r#"{"install": [{"package": "nope"}]}"#).unwrap();

    let output = rootstrap()
        .args(["--color", "never", "--config"])
        .arg(&config)
        .args(["run", "--plan"])
        .arg(&plan)
        .output()
        .expect("Failed to execute rootstrap");

    assert!(!output.status.success());
}
