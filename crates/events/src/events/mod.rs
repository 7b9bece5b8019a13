use serde::{Deserialize, Serialize};

use crate::EventSource;
use rootstrap_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code, e.g. `ops.batch_failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod batch;
pub mod general;
pub mod platform;
pub mod progress;

pub use batch::*;
pub use general::*;
pub use platform::*;
pub use progress::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, operations)
    General(GeneralEvent),

    /// Progress scalar updates
    Progress(ProgressEvent),

    /// Batch lifecycle and classified pacman output
    Batch(BatchEvent),

    /// Child process lifecycle
    Platform(PlatformEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Progress(_) => EventSource::PROGRESS,
            Self::Batch(_) => EventSource::BATCH,
            Self::Platform(_) => EventSource::PLATFORM,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Error { .. } | GeneralEvent::OperationFailed { .. })
            | Self::Batch(BatchEvent::Failed {
                tolerated: false, ..
            })
            | Self::Platform(PlatformEvent::LaunchFailed { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Batch(
                BatchEvent::Failed {
                    tolerated: true, ..
                }
                | BatchEvent::KeyringStepFailed { .. },
            )
            | Self::Platform(PlatformEvent::LineSkipped { .. }) => Level::WARN,

            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Progress(ProgressEvent::Updated { .. })
            | Self::Batch(
                BatchEvent::TotalAnnounced { .. }
                | BatchEvent::DownloadStarted { .. }
                | BatchEvent::InstallStarted { .. },
            )
            | Self::Platform(
                PlatformEvent::ProcessLaunched { .. }
                | PlatformEvent::ProcessExited { .. }
                | PlatformEvent::ProcessKilled { .. },
            ) => Level::DEBUG,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "rootstrap::events::general",
            Self::Progress(_) => "rootstrap::events::progress",
            Self::Batch(_) => "rootstrap::events::batch",
            Self::Platform(_) => "rootstrap::events::platform",
        }
    }
}
