//! Operation orchestration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpsError {
    #[error("{mode} batch failed with {}", describe_exit(.exit_code))]
    BatchFailed { mode: String, exit_code: Option<i32> },

    #[error("{mode} batch produced no output for {seconds}s")]
    BatchTimedOut { mode: String, seconds: u64 },

    #[error("keyring step failed: {step}: {message}")]
    KeyringFailed { step: String, message: String },

    #[error("component not found: {component}")]
    MissingComponent { component: String },

    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

#[allow(clippy::ref_option)]
fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "termination by signal".to_string(),
    }
}

impl UserFacingError for OpsError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::BatchFailed { .. } => {
                Some("Check the package manager output above; remaining batches were skipped.")
            }
            Self::BatchTimedOut { .. } => {
                Some("Raise [runner] idle_timeout_secs or check network access in the target.")
            }
            Self::KeyringFailed { .. } => {
                Some("Run `pacman-key --init` inside the target root manually.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::BatchFailed { .. } | Self::BatchTimedOut { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::BatchFailed { .. } => "ops.batch_failed",
            Self::BatchTimedOut { .. } => "ops.batch_timed_out",
            Self::KeyringFailed { .. } => "ops.keyring_failed",
            Self::MissingComponent { .. } => "ops.missing_component",
            Self::SerializationError { .. } => "ops.serialization_error",
        };
        Some(code)
    }
}
