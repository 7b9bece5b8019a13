//! Offline replay of captured package-manager output

use rootstrap_progress::{ClassifiedEvent, OutputClassifier, ProgressEstimator, ProgressState};
use serde::Serialize;
use tracing::warn;

/// One recognised event and the progress it produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayStep {
    /// 1-based line number in the log
    pub line: usize,
    pub event: ClassifiedEvent,
    /// False for duplicate download lines
    pub accepted: bool,
    pub progress: f64,
}

/// Full trajectory of a replayed log
#[derive(Debug, Clone, Serialize)]
pub struct Replay {
    pub steps: Vec<ReplayStep>,
    pub lines: usize,
    pub unrecognized: usize,
    /// Lines dropped because they were not valid UTF-8
    pub skipped: usize,
    pub state: ProgressState,
}

/// Feed raw `log` bytes through a fresh estimator exactly as a batch would see them.
///
/// Lines are split on `\n` with a trailing `\r` removed, and lines that are
/// not valid UTF-8 are skipped without being classified, as the live line
/// source does. `seed_total` mimics a removal batch, which starts with the
/// package count.
#[must_use]
pub fn replay(classifier: &OutputClassifier, log: &[u8], seed_total: Option<u64>) -> Replay {
    let mut estimator = ProgressEstimator::new();
    if let Some(total) = seed_total {
        estimator.seed_total(total);
    }

    let mut steps = Vec::new();
    let mut lines = 0;
    let mut unrecognized = 0;
    let mut skipped = 0;
    for (number, raw) in raw_lines(log).enumerate() {
        lines += 1;
        let Ok(line) = std::str::from_utf8(raw) else {
            warn!(line = number + 1, bytes = raw.len(), "skipping undecodable log line");
            skipped += 1;
            continue;
        };
        for event in classifier.classify(line) {
            let update = estimator.consume(&event);
            if event.is_unrecognized() {
                unrecognized += 1;
                continue;
            }
            steps.push(ReplayStep {
                line: number + 1,
                event,
                accepted: update.accepted,
                progress: update.progress,
            });
        }
    }

    Replay {
        steps,
        lines,
        unrecognized,
        skipped,
        state: *estimator.state(),
    }
}

fn raw_lines(log: &[u8]) -> impl Iterator<Item = &[u8]> {
    let body = log.strip_suffix(b"\n").unwrap_or(log);
    body.split(|byte| *byte == b'\n')
        .filter(move |_| !log.is_empty())
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}
