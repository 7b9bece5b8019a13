//! Command line interface definition

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// rootstrap - install a package selection into a target root
#[derive(Parser)]
#[command(name = "rootstrap")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Install a package selection into a target root with pacman")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to /var/log/rootstrap/
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    Always,
    Auto,
    Never,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run an operation plan against the target root
    Run {
        /// JSON mapping of mode name to package records
        #[arg(long, value_name = "FILE")]
        plan: PathBuf,

        /// Target root mount point
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,

        /// Keyring to populate after the run (repeatable)
        #[arg(long = "keyring", value_name = "NAME")]
        keyrings: Vec<String>,

        /// Kill a batch that prints nothing for this many seconds
        #[arg(long, value_name = "SECS")]
        idle_timeout: Option<u64>,

        /// Abort the run when a try_install or try_remove batch fails
        #[arg(long)]
        strict: bool,
    },

    /// Replay a captured pacman log and print the progress trajectory
    Classify {
        /// Log file to replay
        log: PathBuf,

        /// Start with this package count, as removal batches do
        #[arg(long, value_name = "N")]
        seed_total: Option<u64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::parse_from([
            "rootstrap",
            "--json",
            "run",
            "--plan",
            "plan.json",
            "--keyring",
            "archlinux",
            "--keyring",
            "archlinuxarm",
            "--strict",
        ]);
        assert!(cli.global.json);
        match cli.command {
            Commands::Run {
                plan,
                keyrings,
                strict,
                root,
                ..
            } => {
                assert_eq!(plan, PathBuf::from("plan.json"));
                assert_eq!(keyrings, vec!["archlinux", "archlinuxarm"]);
                assert!(strict);
                assert!(root.is_none());
            }
            Commands::Classify { .. } => panic!("expected run"),
        }
    }
}
