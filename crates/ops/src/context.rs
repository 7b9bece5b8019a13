//! Operations context for dependency injection

use rootstrap_config::Config;
use rootstrap_errors::{Error, OpsError};
use rootstrap_events::{EventEmitter, EventSender, ProgressSink};
use rootstrap_platform::{Platform, PlatformContext};
use rootstrap_types::{BatchOutcome, RunReport};
use std::sync::Arc;
use uuid::Uuid;

/// Operations context providing access to all system components
pub struct OpsCtx {
    /// Process launching
    pub platform: Platform,
    /// System configuration
    pub config: Config,
    /// Event sender for lifecycle reporting
    pub tx: EventSender,
    /// Receives the progress scalar of the running batch
    pub sink: Arc<dyn ProgressSink>,
    /// Stamped on every event of this run
    pub run_id: String,
}

impl OpsCtx {
    /// Platform context that tags child-process events with this run
    #[must_use]
    pub fn platform_context(&self) -> PlatformContext {
        let mut ctx = PlatformContext::new(Some(self.tx.clone()));
        ctx.add_metadata("run_id", self.run_id.clone());
        ctx
    }

    /// Turn an aborted run into the error that aborted it
    ///
    /// # Errors
    ///
    /// See [`check_report`].
    pub fn check_report(&self, report: &RunReport) -> Result<(), Error> {
        check_report(report, &self.config)
    }
}

/// Turn an aborted run into the error that aborted it
///
/// # Errors
///
/// Returns `OpsError::BatchFailed` or `OpsError::BatchTimedOut` for the
/// batch that stopped the sequence.
pub fn check_report(report: &RunReport, config: &Config) -> Result<(), Error> {
    let Some(batch) = report.failed_batch() else {
        return Ok(());
    };
    let mode = batch.mode.to_string();
    let error = if batch.outcome == BatchOutcome::TimedOut {
        OpsError::BatchTimedOut {
            mode,
            seconds: config.runner.idle_timeout_secs.unwrap_or_default(),
        }
    } else {
        OpsError::BatchFailed {
            mode,
            exit_code: batch.exit_code,
        }
    };
    Err(error.into())
}

impl EventEmitter for OpsCtx {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }

    fn correlation_id(&self) -> Option<String> {
        Some(self.run_id.clone())
    }
}

/// Builder for operations context
#[derive(Default)]
pub struct OpsContextBuilder {
    platform: Option<Platform>,
    config: Option<Config>,
    tx: Option<EventSender>,
    sink: Option<Arc<dyn ProgressSink>>,
}

impl OpsContextBuilder {
    /// Create new context builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the platform; defaults to real child processes
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Set configuration
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Set the progress sink; defaults to `ProgressEvent::Updated` on the event channel
    #[must_use]
    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Build the context
    ///
    /// # Errors
    ///
    /// Returns an error if the event sender or configuration is missing.
    pub fn build(self) -> Result<OpsCtx, Error> {
        let tx = self.tx.ok_or_else(|| OpsError::MissingComponent {
            component: "event_sender".to_string(),
        })?;

        let config = self.config.ok_or_else(|| OpsError::MissingComponent {
            component: "config".to_string(),
        })?;

        let sink = self
            .sink
            .unwrap_or_else(|| Arc::new(tx.clone()) as Arc<dyn ProgressSink>);

        Ok(OpsCtx {
            platform: self.platform.unwrap_or_else(Platform::current),
            config,
            tx,
            sink,
            run_id: Uuid::new_v4().to_string(),
        })
    }
}
