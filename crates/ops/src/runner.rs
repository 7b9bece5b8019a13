//! Batch sequencing: child output in, progress out

use crate::command::batch_command;
use crate::keyring::finalize_keyring;
use crate::OpsCtx;
use rootstrap_errors::{Error, OpsError};
use rootstrap_events::{
    AppEvent, BatchEvent, EventEmitter, FailureContext, GeneralEvent, ProgressEvent,
};
use rootstrap_platform::LineSource;
use rootstrap_progress::{ClassifiedEvent, OutputClassifier, ProgressEstimator};
use rootstrap_types::{BatchOutcome, BatchReport, Operation, OperationPlan, RunReport};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Where the runner is in its per-batch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunnerState {
    Idle,
    BatchRunning,
    BatchSucceeded,
    BatchFailed,
}

/// How a batch's output stream ended
enum StreamEnd {
    Closed,
    IdleTimeout,
}

/// Drives an [`OperationPlan`] one batch at a time.
///
/// Each batch gets a fresh estimator. Lines are classified and folded
/// strictly in the order the child wrote them, and every recognised event
/// forwards the current progress to the context's sink. A successful batch
/// always ends with exactly 1.0.
///
/// A non-zero exit kills the child and stops the sequence, except for
/// try-modes when `tolerate_try_failures` is set. Keyring finalization runs
/// after the sequence no matter how it ended.
pub struct OperationRunner {
    classifier: OutputClassifier,
    estimator: ProgressEstimator,
    state: RunnerState,
    forwarded: f64,
}

impl OperationRunner {
    #[must_use]
    pub fn new(classifier: OutputClassifier) -> Self {
        Self {
            classifier,
            estimator: ProgressEstimator::new(),
            state: RunnerState::Idle,
            forwarded: 0.0,
        }
    }

    /// Runner using the archive suffixes from `ctx.config`
    ///
    /// # Errors
    ///
    /// Returns a config error if no archive suffix is configured.
    pub fn from_context(ctx: &OpsCtx) -> Result<Self, Error> {
        Ok(Self::new(OutputClassifier::new(
            &ctx.config.pacman.archive_suffixes,
        )?))
    }

    #[must_use]
    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// Execute every batch of `plan` in order, then finalize the keyring.
    ///
    /// A failed batch is reported in the returned [`RunReport`]; use
    /// [`OpsCtx::check_report`] to turn it into an error.
    ///
    /// # Errors
    ///
    /// Returns an error if a child cannot be launched or its output cannot
    /// be read. Keyring finalization still runs first.
    pub async fn run(&mut self, ctx: &OpsCtx, plan: &OperationPlan) -> Result<RunReport, Error> {
        let start = Instant::now();
        info!(run_id = %ctx.run_id, batches = plan.len(), "starting package operations");
        ctx.emit_operation_started("package operations");
        warn_if_empty(ctx, plan);

        let mut report = RunReport::default();
        let result = self.run_batches(ctx, plan, &mut report).await;
        self.transition(RunnerState::Idle);

        report.keyring = finalize_keyring(ctx).await;
        report.duration_ms = duration_ms(start);

        let success = result.is_ok() && report.succeeded();
        ctx.emit(AppEvent::Progress(ProgressEvent::Completed {
            batches: report.batches.len(),
            success,
            duration_ms: report.duration_ms,
        }));

        match result {
            Ok(()) => {
                ctx.emit_operation_completed("package operations", success);
                Ok(report)
            }
            Err(e) => {
                ctx.emit_operation_failed("package operations", e.to_string());
                Err(e)
            }
        }
    }

    async fn run_batches(
        &mut self,
        ctx: &OpsCtx,
        plan: &OperationPlan,
        report: &mut RunReport,
    ) -> Result<(), Error> {
        for (index, operation) in plan.iter().enumerate() {
            if report.aborted {
                debug!(batch = index, mode = %operation.mode, "not attempted after abort");
                report
                    .batches
                    .push(idle_report(operation, BatchOutcome::NotAttempted));
                continue;
            }

            let batch = self.run_batch(ctx, index, operation).await?;
            if matches!(batch.outcome, BatchOutcome::Failed | BatchOutcome::TimedOut) {
                report.aborted = true;
            }
            report.batches.push(batch);
        }
        Ok(())
    }

    /// Run one batch to completion.
    ///
    /// # Errors
    ///
    /// Returns an error if the child cannot be launched or read. A non-zero
    /// exit is not an error here; it is the batch's outcome.
    pub async fn run_batch(
        &mut self,
        ctx: &OpsCtx,
        index: usize,
        operation: &Operation,
    ) -> Result<BatchReport, Error> {
        let start = Instant::now();
        let mode = operation.mode;

        if operation.is_empty() {
            debug!(batch = index, %mode, "skipping batch with no packages");
            ctx.emit(AppEvent::Batch(BatchEvent::Skipped { batch: index, mode }));
            return Ok(idle_report(operation, BatchOutcome::Skipped));
        }

        self.estimator.reset();
        self.forwarded = 0.0;
        if mode.is_removal() {
            // removal output rarely announces a count
            self.estimator.seed_total(operation.packages.len() as u64);
        }
        self.transition(RunnerState::BatchRunning);

        info!(batch = index, %mode, packages = operation.packages.len(), "batch started");
        ctx.emit(AppEvent::Batch(BatchEvent::Started {
            batch: index,
            mode,
            packages: operation.packages.len(),
        }));

        let cmd = batch_command(&ctx.config, operation);
        let mut source = match ctx.platform.spawn_lines(&ctx.platform_context(), cmd).await {
            Ok(source) => source,
            Err(e) => {
                self.transition(RunnerState::BatchFailed);
                return Err(e);
            }
        };

        let end = match self.stream(ctx, index, source.as_mut()).await {
            Ok(end) => end,
            Err(e) => {
                self.transition(RunnerState::BatchFailed);
                kill_child(source.as_mut(), index).await;
                return Err(e);
            }
        };

        let (outcome, exit_code) = match end {
            StreamEnd::IdleTimeout => {
                kill_child(source.as_mut(), index).await;
                (BatchOutcome::TimedOut, None)
            }
            StreamEnd::Closed => {
                let exit_code = source.wait().await?;
                if exit_code == Some(0) {
                    (BatchOutcome::Succeeded, exit_code)
                } else {
                    kill_child(source.as_mut(), index).await;
                    let tolerated =
                        mode.is_tolerant() && ctx.config.runner.tolerate_try_failures;
                    let outcome = if tolerated {
                        BatchOutcome::FailedTolerated
                    } else {
                        BatchOutcome::Failed
                    };
                    (outcome, exit_code)
                }
            }
        };

        let duration_ms = duration_ms(start);
        if outcome == BatchOutcome::Succeeded {
            self.transition(RunnerState::BatchSucceeded);
            self.forward(ctx, 1.0);
            info!(batch = index, %mode, duration_ms, "batch succeeded");
            ctx.emit(AppEvent::Batch(BatchEvent::Succeeded {
                batch: index,
                mode,
                duration_ms,
            }));
        } else {
            self.transition(RunnerState::BatchFailed);
            let error = if outcome == BatchOutcome::TimedOut {
                OpsError::BatchTimedOut {
                    mode: mode.to_string(),
                    seconds: ctx.config.runner.idle_timeout_secs.unwrap_or_default(),
                }
            } else {
                OpsError::BatchFailed {
                    mode: mode.to_string(),
                    exit_code,
                }
            };
            let tolerated = outcome == BatchOutcome::FailedTolerated;
            if tolerated {
                warn!(batch = index, %mode, error = %error, "batch failed; continuing");
            } else {
                warn!(batch = index, %mode, error = %error, "batch failed; aborting run");
            }
            ctx.emit(AppEvent::Batch(BatchEvent::Failed {
                batch: index,
                mode,
                exit_code,
                tolerated,
                failure: FailureContext::from_error(&error),
            }));
        }

        let counters = self.estimator.state();
        Ok(BatchReport {
            mode,
            packages: operation.packages.len(),
            outcome,
            exit_code,
            total: counters.total,
            downloaded: counters.downloaded,
            installed: counters.installed,
            final_progress: self.forwarded,
            duration_ms,
        })
    }

    async fn stream(
        &mut self,
        ctx: &OpsCtx,
        batch: usize,
        source: &mut dyn LineSource,
    ) -> Result<StreamEnd, Error> {
        let idle = ctx.config.idle_timeout();
        loop {
            let next = match idle {
                Some(limit) => match tokio::time::timeout(limit, source.next_line()).await {
                    Ok(next) => next?,
                    Err(_) => {
                        warn!(batch, seconds = limit.as_secs(), "no output within idle timeout");
                        return Ok(StreamEnd::IdleTimeout);
                    }
                },
                None => source.next_line().await?,
            };

            let Some(line) = next else {
                return Ok(StreamEnd::Closed);
            };
            trace!(batch, %line, "output line");

            for event in self.classifier.classify(&line) {
                self.apply(ctx, batch, &event);
            }
        }
    }

    fn apply(&mut self, ctx: &OpsCtx, batch: usize, event: &ClassifiedEvent) {
        let update = self.estimator.consume(event);
        if event.is_unrecognized() {
            return;
        }

        if let Some(phase) = update.phase_entered {
            debug!(batch, phase = phase.as_str(), "phase entered");
            ctx.emit(AppEvent::Batch(BatchEvent::PhaseEntered { batch, phase }));
        }

        if update.accepted {
            let counters = *self.estimator.state();
            let lifecycle = match event {
                ClassifiedEvent::TotalAnnounced(total) => Some(BatchEvent::TotalAnnounced {
                    batch,
                    total: *total,
                }),
                ClassifiedEvent::DownloadStarted(package) => Some(BatchEvent::DownloadStarted {
                    batch,
                    package: package.clone(),
                    downloaded: counters.downloaded,
                    total: counters.total,
                }),
                ClassifiedEvent::InstallStarted(package) => Some(BatchEvent::InstallStarted {
                    batch,
                    package: package.clone(),
                    installed: counters.installed,
                    total: counters.total,
                }),
                ClassifiedEvent::Unrecognized => None,
            };
            if let Some(lifecycle) = lifecycle {
                ctx.emit(AppEvent::Batch(lifecycle));
            }
        }

        self.forward(ctx, update.progress);
    }

    /// Clamp, keep monotonic, hand to the sink
    fn forward(&mut self, ctx: &OpsCtx, progress: f64) {
        let value = progress.clamp(0.0, 1.0).max(self.forwarded);
        self.forwarded = value;
        ctx.sink.report_progress(value);
    }

    fn transition(&mut self, next: RunnerState) {
        if self.state != next {
            trace!(from = ?self.state, to = ?next, "runner state");
            self.state = next;
        }
    }
}

/// A failed kill must not hide the batch outcome it was part of
async fn kill_child(source: &mut dyn LineSource, batch: usize) {
    if let Err(e) = source.kill().await {
        warn!(batch, error = %e, "failed to kill child process");
    }
}

fn idle_report(operation: &Operation, outcome: BatchOutcome) -> BatchReport {
    BatchReport {
        mode: operation.mode,
        packages: operation.packages.len(),
        outcome,
        exit_code: None,
        total: 0,
        downloaded: 0,
        installed: 0,
        final_progress: 0.0,
        duration_ms: 0,
    }
}

fn duration_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn warn_if_empty(ctx: &OpsCtx, plan: &OperationPlan) {
    if plan.iter().all(Operation::is_empty) {
        ctx.emit(AppEvent::General(GeneralEvent::warning(
            "operation plan contains no packages",
        )));
    }
}
