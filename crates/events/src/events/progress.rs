use serde::{Deserialize, Serialize};

/// Updates to the single progress scalar a run exposes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Completion fraction of the running batch, in `[0.0, 1.0]`
    Updated { fraction: f64 },

    /// The whole plan finished and nothing further will be reported
    Completed {
        batches: usize,
        success: bool,
        duration_ms: u64,
    },
}
