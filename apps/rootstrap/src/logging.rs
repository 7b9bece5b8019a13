//! Structured logging integration for events
//!
//! Every event that reaches the CLI is also written to the tracing
//! subscriber, so `--debug` logs carry the full run history with the
//! event's metadata attached.

use rootstrap_events::{
    AppEvent, BatchEvent, EventLevel, EventMessage, GeneralEvent, PlatformEvent, ProgressEvent,
};
use tracing::{debug, error, info, trace, warn};

/// Log an `AppEvent` using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    let source = meta.source.as_str();
    let correlation = meta.correlation_id.as_deref().unwrap_or("-");

    match &message.event {
        AppEvent::Batch(event) => log_batch_event(event, source, correlation),
        AppEvent::Platform(event) => log_platform_event(event, source, correlation),
        AppEvent::Progress(ProgressEvent::Updated { fraction }) => {
            trace!(source, correlation, fraction, "progress");
        }
        AppEvent::Progress(ProgressEvent::Completed {
            batches,
            success,
            duration_ms,
        }) => {
            info!(source, correlation, batches, success, duration_ms, "run finished");
        }
        AppEvent::General(event) => log_general_event(event, meta.level, source, correlation),
    }
}

fn log_batch_event(event: &BatchEvent, source: &str, correlation: &str) {
    match event {
        BatchEvent::Started {
            batch,
            mode,
            packages,
        } => info!(source, correlation, batch, %mode, packages, "batch started"),
        BatchEvent::Skipped { batch, mode } => {
            debug!(source, correlation, batch, %mode, "batch skipped");
        }
        BatchEvent::PhaseEntered { batch, phase } => {
            debug!(source, correlation, batch, phase = phase.as_str(), "phase entered");
        }
        BatchEvent::TotalAnnounced { batch, total } => {
            debug!(source, correlation, batch, total, "package count announced");
        }
        BatchEvent::DownloadStarted {
            batch,
            package,
            downloaded,
            total,
        } => debug!(source, correlation, batch, %package, downloaded, total, "download started"),
        BatchEvent::InstallStarted {
            batch,
            package,
            installed,
            total,
        } => debug!(source, correlation, batch, %package, installed, total, "install started"),
        BatchEvent::Succeeded {
            batch,
            mode,
            duration_ms,
        } => info!(source, correlation, batch, %mode, duration_ms, "batch succeeded"),
        BatchEvent::Failed {
            batch,
            mode,
            exit_code,
            tolerated,
            failure,
        } => {
            if *tolerated {
                warn!(
                    source,
                    correlation,
                    batch,
                    %mode,
                    exit_code = ?exit_code,
                    code = ?failure.code,
                    message = %failure.message,
                    "batch failed (tolerated)"
                );
            } else {
                error!(
                    source,
                    correlation,
                    batch,
                    %mode,
                    exit_code = ?exit_code,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "batch failed"
                );
            }
        }
        BatchEvent::KeyringStepCompleted { step } => {
            info!(source, correlation, %step, "keyring step completed");
        }
        BatchEvent::KeyringStepFailed { step, failure } => warn!(
            source,
            correlation,
            %step,
            message = %failure.message,
            "keyring step failed"
        ),
    }
}

fn log_platform_event(event: &PlatformEvent, source: &str, correlation: &str) {
    match event {
        PlatformEvent::ProcessLaunched { command, args } => {
            debug!(source, correlation, %command, args = ?args, "process launched");
        }
        PlatformEvent::LaunchFailed { command, failure } => error!(
            source,
            correlation,
            %command,
            code = ?failure.code,
            message = %failure.message,
            "process launch failed"
        ),
        PlatformEvent::ProcessExited {
            command,
            exit_code,
            lines,
            duration_ms,
        } => debug!(
            source,
            correlation,
            %command,
            exit_code = ?exit_code,
            lines,
            duration_ms,
            "process exited"
        ),
        PlatformEvent::ProcessKilled { command } => {
            debug!(source, correlation, %command, "process killed");
        }
        PlatformEvent::LineSkipped { command, bytes } => {
            warn!(source, correlation, %command, bytes, "undecodable line skipped");
        }
    }
}

fn log_general_event(event: &GeneralEvent, level: EventLevel, source: &str, correlation: &str) {
    match event {
        GeneralEvent::Warning { message, context } => {
            warn!(source, correlation, context = ?context, "{message}");
        }
        GeneralEvent::Error { message, details } => {
            error!(source, correlation, details = ?details, "{message}");
        }
        GeneralEvent::DebugLog { message, context } => {
            debug!(source, correlation, context = ?context, "{message}");
        }
        GeneralEvent::OperationStarted { operation } => {
            info!(source, correlation, %operation, "operation started");
        }
        GeneralEvent::OperationCompleted { operation, success } => {
            info!(source, correlation, %operation, success, "operation completed");
        }
        GeneralEvent::OperationFailed { operation, error } => {
            if level >= EventLevel::Error {
                error!(source, correlation, %operation, %error, "operation failed");
            } else {
                warn!(source, correlation, %operation, %error, "operation failed");
            }
        }
    }
}
