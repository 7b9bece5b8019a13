//! rootstrap - install a package selection into a target root
//!
//! This is the main CLI application. It loads configuration, hands the
//! operation plan to the ops crate and renders the events it emits.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, ColorChoice, Commands};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use rootstrap_config::{constants, Config};
use rootstrap_events::{EventReceiver, EventSender};
use rootstrap_ops::{OperationResult, OpsContextBuilder};
use rootstrap_progress::OutputClassifier;
use rootstrap_types::OperationPlan;
use std::process;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting rootstrap v{}", env!("CARGO_PKG_VERSION"));

    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli.command)?;

    let colors_enabled = match cli.global.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stderr().features().colors_supported(),
    };
    let renderer = OutputRenderer::new(cli.global.json, colors_enabled);
    let mut event_handler = EventHandler::new(colors_enabled, cli.global.debug);

    let (event_sender, event_receiver) = rootstrap_events::channel();

    let result = execute_command_with_events(
        cli.command,
        config.clone(),
        event_sender,
        event_receiver,
        &mut event_handler,
        cli.global.json,
    )
    .await?;

    renderer.render_result(&result)?;

    if let OperationResult::Run(report) = &result {
        rootstrap_ops::check_report(report, &config)?;
    }

    info!("Command completed successfully");
    Ok(())
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    config: Config,
    event_sender: EventSender,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
    json_mode: bool,
) -> Result<OperationResult, CliError> {
    let mut command_future = Box::pin(execute_command(command, config, event_sender));

    // Handle events concurrently with command execution
    loop {
        select! {
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(message) = event_receiver.try_recv() {
                    dispatch(event_handler, message, json_mode);
                }
                return result;
            }

            message = event_receiver.recv() => {
                match message {
                    Some(message) => dispatch(event_handler, message, json_mode),
                    None => { /* Channel closed: keep waiting for command to finish */ }
                }
            }
        }
    }
}

/// JSON mode keeps stdout clean; events still reach the log
fn dispatch(handler: &mut EventHandler, message: rootstrap_events::EventMessage, json_mode: bool) {
    if json_mode {
        logging::log_event_with_tracing(&message);
    } else {
        handler.handle_event(message);
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    config: Config,
    tx: EventSender,
) -> Result<OperationResult, CliError> {
    match command {
        Commands::Run { plan, .. } => {
            let plan = OperationPlan::load(&plan).await?;
            let ctx = OpsContextBuilder::new()
                .with_config(config)
                .with_event_sender(tx)
                .build()?;
            let report = rootstrap_ops::run(&ctx, &plan).await?;
            Ok(OperationResult::Run(report))
        }

        Commands::Classify { log, seed_total } => {
            let bytes = tokio::fs::read(&log).await?;
            let classifier = OutputClassifier::new(&config.pacman.archive_suffixes)?;
            let replay = rootstrap_ops::replay(&classifier, &bytes, seed_total);
            Ok(OperationResult::Replay(replay))
        }
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, command: &Commands) -> Result<(), CliError> {
    if let Commands::Run {
        root,
        keyrings,
        idle_timeout,
        strict,
        ..
    } = command
    {
        if let Some(root) = root {
            config.target.root.clone_from(root);
        }
        if !keyrings.is_empty() {
            config.pacman.keyrings.clone_from(keyrings);
        }
        if idle_timeout.is_some() {
            config.runner.idle_timeout_secs = *idle_timeout;
        }
        if *strict {
            config.runner.tolerate_try_failures = false;
        }
        config.validate()?;
    }
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    // Check if debug logging is enabled
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if debug_enabled {
        // Debug mode: structured JSON logs to file
        let log_dir = std::path::Path::new(constants::LOGS_DIR);
        let log_file = log_dir.join(format!(
            "rootstrap-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        if let Ok(file) = std::fs::create_dir_all(log_dir).and_then(|()| std::fs::File::create(&log_file))
        {
            tracing_subscriber::fmt()
                .json()
                .with_writer(file)
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                        tracing_subscriber::EnvFilter::new("info,rootstrap=debug,rootstrap_ops=debug")
                    }),
                )
                .init();
            if !json_mode {
                eprintln!("Debug logging enabled: {}", log_file.display());
            }
            return;
        }
        if !json_mode {
            eprintln!("Warning: Failed to create log file in {}", log_dir.display());
        }
    }

    if json_mode {
        // JSON mode: suppress console logging to avoid contaminating JSON
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        // Normal mode: minimal logging to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("warn,rootstrap=warn,rootstrap_ops=warn")
                }),
            )
            .init();
    }
}
