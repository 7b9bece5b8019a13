//! Progress sink: where the runner's progress scalar ends up

use crate::{AppEvent, EventEmitter, EventSender, ProgressEvent};
use std::sync::Arc;

/// Receives the overall completion fraction of the running batch.
///
/// Called many times with non-decreasing values in `[0.0, 1.0]`.
/// Implementations must return promptly.
pub trait ProgressSink: Send + Sync {
    fn report_progress(&self, fraction: f64);
}

/// Progress flows into the event channel as `ProgressEvent::Updated`
impl ProgressSink for EventSender {
    fn report_progress(&self, fraction: f64) {
        self.emit(AppEvent::Progress(ProgressEvent::Updated { fraction }));
    }
}

impl<T: ProgressSink + ?Sized> ProgressSink for Arc<T> {
    fn report_progress(&self, fraction: f64) {
        (**self).report_progress(fraction);
    }
}
