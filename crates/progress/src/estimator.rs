//! Per-batch progress accumulation

use crate::ClassifiedEvent;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Work phase a classified event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Download,
    Install,
}

impl Phase {
    /// Number of times the increment is applied for one event of this phase
    #[must_use]
    pub fn weight(self) -> u32 {
        match self {
            Self::Download => 1,
            Self::Install => 2,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::Install => "install",
        }
    }
}

/// Counters for the batch currently running
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressState {
    /// Expected package count; 0 until announced
    pub total: u64,
    /// Distinct download starts seen
    pub downloaded: u64,
    /// Install starts seen
    pub installed: u64,
    /// Accumulated progress in `[0.0, 1.0]`
    pub progress: f64,
}

/// What a single `consume` call did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorUpdate {
    /// Progress after the event
    pub progress: f64,
    /// False for `Unrecognized` and suppressed duplicate downloads
    pub accepted: bool,
    /// Set when this event was the first of its phase in the batch
    pub phase_entered: Option<Phase>,
}

/// Folds classified events into a monotonically non-decreasing progress value.
///
/// Each accepted phase event adds `(0.05 + 0.95 * counter / total) / total`
/// once per unit of phase weight. Install events weigh twice as much as
/// downloads. The sum is not normalised, so it can stop short of 1.0 or run
/// past it; stored progress is capped at 1.0 and the runner reports 1.0
/// explicitly when a batch succeeds.
///
/// Download starts are de-duplicated against the previous download name
/// because pacman reprints the current target while it transfers. Install
/// starts are never de-duplicated: each one is a distinct package.
#[derive(Debug, Clone, Default)]
pub struct ProgressEstimator {
    state: ProgressState,
    accumulated: f64,
    last_download: Option<String>,
    download_seen: bool,
    install_seen: bool,
}

impl ProgressEstimator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every counter for a new batch
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Set the expected total before any output arrives.
    ///
    /// Used for removals, whose output rarely announces a count. A later
    /// `TotalAnnounced` still overwrites it.
    pub fn seed_total(&mut self, total: u64) {
        self.state.total = total;
    }

    #[must_use]
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    /// Current progress, always in `[0.0, 1.0]`
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.state.progress
    }

    /// Raw sum of increments before capping, for diagnostics
    #[must_use]
    pub fn accumulated(&self) -> f64 {
        self.accumulated
    }

    /// Apply one event and return the resulting progress
    pub fn consume(&mut self, event: &ClassifiedEvent) -> EstimatorUpdate {
        match event {
            ClassifiedEvent::TotalAnnounced(total) => {
                debug!(total, "package count announced");
                self.state.total = *total;
                self.update(true, None)
            }
            ClassifiedEvent::DownloadStarted(name) => {
                if self.last_download.as_deref() == Some(name.as_str()) {
                    trace!(package = %name, "repeated download line suppressed");
                    return self.update(false, None);
                }
                self.last_download = Some(name.clone());
                self.state.downloaded += 1;
                debug!(package = %name, downloaded = self.state.downloaded, "download started");

                let entered = !std::mem::replace(&mut self.download_seen, true);
                self.advance(Phase::Download, self.state.downloaded);
                self.update(true, entered.then_some(Phase::Download))
            }
            ClassifiedEvent::InstallStarted(name) => {
                self.state.installed += 1;
                debug!(package = %name, installed = self.state.installed, "install started");

                let entered = !std::mem::replace(&mut self.install_seen, true);
                self.advance(Phase::Install, self.state.installed);
                self.update(true, entered.then_some(Phase::Install))
            }
            ClassifiedEvent::Unrecognized => self.update(false, None),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn advance(&mut self, phase: Phase, counter: u64) {
        if self.state.total == 0 {
            return;
        }
        let total = self.state.total as f64;
        let step = (0.05 + 0.95 * (counter as f64 / total)) / total;
        for _ in 0..phase.weight() {
            self.accumulated += step;
        }
        self.state.progress = self.accumulated.clamp(0.0, 1.0).max(self.state.progress);
        trace!(
            phase = phase.as_str(),
            step,
            progress = self.state.progress,
            "progress advanced"
        );
    }

    fn update(&self, accepted: bool, phase_entered: Option<Phase>) -> EstimatorUpdate {
        EstimatorUpdate {
            progress: self.state.progress,
            accepted,
            phase_entered,
        }
    }
}
