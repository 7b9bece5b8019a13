use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Child process events emitted by the platform layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PlatformEvent {
    ProcessLaunched {
        /// Program name
        command: String,
        /// Arguments passed to the program
        args: Vec<String>,
    },

    LaunchFailed {
        command: String,
        failure: FailureContext,
    },

    /// Child exited; `exit_code` is `None` when it died from a signal
    ProcessExited {
        command: String,
        exit_code: Option<i32>,
        /// Lines yielded to the reader
        lines: u64,
        duration_ms: u64,
    },

    /// Child was killed by us after a failure or timeout
    ProcessKilled { command: String },

    /// A stdout line that was not valid UTF-8 was dropped
    LineSkipped { command: String, bytes: usize },
}
