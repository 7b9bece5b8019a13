use serde::{Deserialize, Serialize};

use super::FailureContext;
use rootstrap_progress::Phase;
use rootstrap_types::OperationMode;

/// Lifecycle of one batch: one mode, one package list, one child process.
///
/// `batch` is the zero-based position of the batch in the plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BatchEvent {
    Started {
        batch: usize,
        mode: OperationMode,
        packages: usize,
    },

    /// Batch had no packages; no process was started
    Skipped { batch: usize, mode: OperationMode },

    /// First download or install line seen in this batch
    PhaseEntered { batch: usize, phase: Phase },

    TotalAnnounced { batch: usize, total: u64 },

    DownloadStarted {
        batch: usize,
        package: String,
        downloaded: u64,
        total: u64,
    },

    InstallStarted {
        batch: usize,
        package: String,
        installed: u64,
        total: u64,
    },

    Succeeded {
        batch: usize,
        mode: OperationMode,
        duration_ms: u64,
    },

    Failed {
        batch: usize,
        mode: OperationMode,
        /// `None` when the child was terminated by a signal or timed out
        exit_code: Option<i32>,
        /// Try-modes may fail without aborting the plan
        tolerated: bool,
        failure: FailureContext,
    },

    /// A keyring finalization step ran successfully
    KeyringStepCompleted { step: String },

    KeyringStepFailed {
        step: String,
        failure: FailureContext,
    },
}
