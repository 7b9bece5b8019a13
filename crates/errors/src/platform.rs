//! Process and platform error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Errors raised while launching or talking to child processes
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlatformError {
    #[error("failed to launch {command}: {message}")]
    LaunchFailed { command: String, message: String },

    #[error("command not found: {command}")]
    CommandNotFound { command: String },

    #[error("permission denied: {operation} - {message}")]
    PermissionDenied { operation: String, message: String },

    #[error("process execution failed: {command} - {message}")]
    ProcessExecutionFailed { command: String, message: String },

    #[error("undecodable output line from {command} ({bytes} bytes)")]
    StreamDecodingFailed { command: String, bytes: usize },

    #[error("failed to terminate {command}: {message}")]
    KillFailed { command: String, message: String },
}

impl PlatformError {
    /// Map an `io::Error` raised by `spawn` into the launch taxonomy.
    #[must_use]
    pub fn from_spawn(command: &str, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::CommandNotFound {
                command: command.to_string(),
            },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                operation: format!("spawn {command}"),
                message: err.to_string(),
            },
            _ => Self::LaunchFailed {
                command: command.to_string(),
                message: err.to_string(),
            },
        }
    }

    /// Whether the error happened before any output was produced.
    #[must_use]
    pub fn is_launch_error(&self) -> bool {
        matches!(
            self,
            Self::LaunchFailed { .. } | Self::CommandNotFound { .. } | Self::PermissionDenied { .. }
        )
    }
}

impl UserFacingError for PlatformError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::CommandNotFound { .. } => {
                Some("Install the package manager on the host or set [pacman] program.")
            }
            Self::PermissionDenied { .. } => Some("Run rootstrap as root."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::ProcessExecutionFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::LaunchFailed { .. } => "platform.launch_failed",
            Self::CommandNotFound { .. } => "platform.command_not_found",
            Self::PermissionDenied { .. } => "platform.permission_denied",
            Self::ProcessExecutionFailed { .. } => "platform.process_execution_failed",
            Self::StreamDecodingFailed { .. } => "platform.stream_decoding_failed",
            Self::KillFailed { .. } => "platform.kill_failed",
        };
        Some(code)
    }
}
