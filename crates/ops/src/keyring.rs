//! Keyring finalization inside the target

use crate::command::{keyring_init_command, keyring_populate_command};
use crate::OpsCtx;
use rootstrap_errors::OpsError;
use rootstrap_events::{AppEvent, BatchEvent, EventEmitter, FailureContext};
use rootstrap_platform::PlatformCommand;
use rootstrap_types::KeyringReport;
use tracing::{info, warn};

/// Initialise and populate the target's pacman keyring.
///
/// Both steps always run, whatever happened before or to each other.
/// Failures are logged and reported, never returned.
pub async fn finalize_keyring(ctx: &OpsCtx) -> Vec<KeyringReport> {
    let steps = [
        ("init", keyring_init_command(&ctx.config)),
        ("populate", keyring_populate_command(&ctx.config)),
    ];

    let mut reports = Vec::with_capacity(steps.len());
    for (step, cmd) in steps {
        reports.push(run_step(ctx, step, cmd).await);
    }
    reports
}

async fn run_step(ctx: &OpsCtx, step: &str, cmd: PlatformCommand) -> KeyringReport {
    let rendered = cmd.to_string();
    let failure = match ctx
        .platform
        .execute_command(&ctx.platform_context(), cmd)
        .await
    {
        Ok(output) if output.success() => None,
        Ok(output) => Some(match output.exit_code {
            Some(code) => format!("exited with code {code}"),
            None => "terminated by signal".to_string(),
        }),
        Err(e) => Some(e.to_string()),
    };

    match failure {
        None => {
            info!(step, command = %rendered, "keyring step completed");
            ctx.emit(AppEvent::Batch(BatchEvent::KeyringStepCompleted {
                step: step.to_string(),
            }));
            KeyringReport {
                step: step.to_string(),
                success: true,
                message: None,
            }
        }
        Some(message) => {
            let error = OpsError::KeyringFailed {
                step: step.to_string(),
                message: message.clone(),
            };
            warn!(step, command = %rendered, error = %error, "keyring step failed");
            ctx.emit(AppEvent::Batch(BatchEvent::KeyringStepFailed {
                step: step.to_string(),
                failure: FailureContext::from_error(&error),
            }));
            KeyringReport {
                step: step.to_string(),
                success: false,
                message: Some(message),
            }
        }
    }
}
