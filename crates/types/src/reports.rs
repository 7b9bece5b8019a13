//! Report type definitions for operations

use crate::OperationMode;
use serde::{Deserialize, Serialize};

/// Terminal state of one operation batch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOutcome {
    /// Child exited with status 0
    Succeeded,
    /// Child exited non-zero; the run was aborted
    Failed,
    /// Child exited non-zero in a try-mode; the run continued
    FailedTolerated,
    /// Child printed nothing within the idle timeout and was killed
    TimedOut,
    /// Batch had no packages and was not launched
    Skipped,
    /// Never started because an earlier batch aborted the run
    NotAttempted,
}

/// Per-batch summary
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchReport {
    pub mode: OperationMode,
    pub packages: usize,
    pub outcome: BatchOutcome,
    /// `None` when not launched or killed by a signal
    pub exit_code: Option<i32>,
    pub total: u64,
    pub downloaded: u64,
    pub installed: u64,
    /// Last value forwarded to the progress sink
    pub final_progress: f64,
    pub duration_ms: u64,
}

/// Result of one keyring finalization step
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyringReport {
    pub step: String,
    pub success: bool,
    pub message: Option<String>,
}

/// Summary of a whole plan execution
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub batches: Vec<BatchReport>,
    pub keyring: Vec<KeyringReport>,
    pub aborted: bool,
    pub duration_ms: u64,
}

impl RunReport {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        !self.aborted
    }

    /// The batch that aborted the run, if any
    #[must_use]
    pub fn failed_batch(&self) -> Option<&BatchReport> {
        self.batches
            .iter()
            .find(|batch| matches!(batch.outcome, BatchOutcome::Failed | BatchOutcome::TimedOut))
    }
}
