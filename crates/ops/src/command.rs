//! Package-manager command lines for each batch mode

use rootstrap_config::Config;
use rootstrap_platform::PlatformCommand;
use rootstrap_types::{Operation, OperationMode};

/// Command that runs one batch.
///
/// Installs run pacman on the host against the target's root, cache and
/// database. Removals run pacman inside the target through chroot.
#[must_use]
pub fn batch_command(config: &Config, operation: &Operation) -> PlatformCommand {
    let pacman = &config.pacman;
    let mut cmd = match operation.mode {
        OperationMode::Install | OperationMode::TryInstall | OperationMode::LocalInstall => {
            let sync = if operation.mode == OperationMode::LocalInstall {
                "-U"
            } else {
                "-Sy"
            };
            let mut cmd = PlatformCommand::new(&pacman.program);
            cmd.arg("--noconfirm")
                .arg(sync)
                .arg("--cachedir")
                .arg(config.cache_dir().to_string_lossy())
                .arg("--root")
                .arg(config.root().to_string_lossy())
                .arg("--dbpath")
                .arg(config.db_path().to_string_lossy());
            cmd
        }
        OperationMode::Remove | OperationMode::TryRemove => {
            let mut cmd = chroot(config);
            cmd.arg(&pacman.program).args(["-Rs", "--noconfirm"]);
            cmd
        }
    };
    cmd.args(&operation.packages)
        .env("LC_ALL", &pacman.locale);
    cmd
}

/// `pacman-key --init` inside the target
#[must_use]
pub fn keyring_init_command(config: &Config) -> PlatformCommand {
    let mut cmd = chroot(config);
    cmd.arg(&config.pacman.key_program)
        .arg("--init")
        .env("LC_ALL", &config.pacman.locale);
    cmd
}

/// `pacman-key --populate <keyrings>` inside the target
#[must_use]
pub fn keyring_populate_command(config: &Config) -> PlatformCommand {
    let mut cmd = chroot(config);
    cmd.arg(&config.pacman.key_program)
        .arg("--populate")
        .args(&config.pacman.keyrings)
        .env("LC_ALL", &config.pacman.locale);
    cmd
}

fn chroot(config: &Config) -> PlatformCommand {
    let mut cmd = PlatformCommand::new(&config.pacman.chroot_program);
    cmd.arg(config.root().to_string_lossy());
    cmd
}
