#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Package operation orchestration for rootstrap
//!
//! Runs an ordered plan of pacman batches against a target root, turning
//! each child's output into a progress scalar and lifecycle events, and
//! finalizes the target's keyring afterwards.

mod command;
mod context;
mod keyring;
mod replay;
mod runner;

pub use command::{batch_command, keyring_init_command, keyring_populate_command};
pub use context::{check_report, OpsContextBuilder, OpsCtx};
pub use keyring::finalize_keyring;
pub use replay::{replay, Replay, ReplayStep};
pub use runner::{OperationRunner, RunnerState};

use rootstrap_errors::{Error, OpsError};
use rootstrap_types::{OperationPlan, RunReport};
use serde::Serialize;

/// Operation result that can be serialized for CLI output
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OperationResult {
    /// Outcome of a plan run
    Run(RunReport),
    /// Trajectory of a replayed log
    Replay(Replay),
}

impl OperationResult {
    /// Convert to JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| {
            OpsError::SerializationError {
                message: e.to_string(),
            }
            .into()
        })
    }
}

/// Run `plan` with a runner configured from `ctx`
///
/// # Errors
///
/// Returns an error if the configuration is unusable or a child process
/// cannot be launched. Failed batches are reported in the `RunReport`.
pub async fn run(ctx: &OpsCtx, plan: &OperationPlan) -> Result<RunReport, Error> {
    OperationRunner::from_context(ctx)?.run(ctx, plan).await
}
