use rootstrap_errors::{Error, OpsError};
use rootstrap_events::{
    channel, AppEvent, BatchEvent, EventEmitter, EventLevel, EventMessage, EventMeta, EventSender,
    EventSource, FailureContext, GeneralEvent, PlatformEvent, ProgressEvent, ProgressSink,
};
use rootstrap_types::OperationMode;
use std::sync::Mutex;

#[derive(Default)]
struct RecordingEmitter {
    events: Mutex<Vec<EventMessage>>,
}

impl EventEmitter for RecordingEmitter {
    fn event_sender(&self) -> Option<&EventSender> {
        None
    }

    fn correlation_id(&self) -> Option<String> {
        Some("run-1".to_string())
    }

    fn emit_with_meta(&self, meta: EventMeta, event: AppEvent) {
        self.events
            .lock()
            .unwrap()
            .push(EventMessage::new(meta, event));
    }
}

#[tokio::test]
async fn sender_emits_into_channel() {
    let (tx, mut rx) = channel();
    tx.emit_warning("careful");
    tx.emit_operation_started("run");

    let first = rx.recv().await.unwrap();
    assert_eq!(first.meta.level, EventLevel::Warn);
    assert_eq!(first.meta.source, EventSource::GENERAL);
    assert!(matches!(
        first.event,
        AppEvent::General(GeneralEvent::Warning { ref message, .. }) if message == "careful"
    ));

    let second = rx.recv().await.unwrap();
    assert!(matches!(
        second.event,
        AppEvent::General(GeneralEvent::OperationStarted { .. })
    ));
}

#[test]
fn emitting_after_receiver_dropped_is_silent() {
    let (tx, rx) = channel();
    drop(rx);
    tx.emit_error("nobody listens");
    tx.report_progress(0.5);
}

#[tokio::test]
async fn sender_is_a_progress_sink() {
    let (tx, mut rx) = channel();
    tx.report_progress(0.25);
    let message = rx.recv().await.unwrap();
    assert_eq!(message.meta.source, EventSource::PROGRESS);
    assert_eq!(message.meta.level, EventLevel::Debug);
    match message.event {
        AppEvent::Progress(ProgressEvent::Updated { fraction }) => assert_eq!(fraction, 0.25),
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn correlation_id_is_stamped() {
    let emitter = RecordingEmitter::default();
    emitter.emit_debug("hello");
    let events = emitter.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].meta.correlation_id.as_deref(), Some("run-1"));
}

#[test]
fn failed_batch_level_depends_on_tolerance() {
    let error: Error = OpsError::BatchFailed {
        mode: "install".into(),
        exit_code: Some(1),
    }
    .into();
    let failure = FailureContext::from_error(&error);
    assert!(failure.code.is_some());

    let fatal = AppEvent::Batch(BatchEvent::Failed {
        batch: 0,
        mode: OperationMode::Install,
        exit_code: Some(1),
        tolerated: false,
        failure: failure.clone(),
    });
    let tolerated = AppEvent::Batch(BatchEvent::Failed {
        batch: 1,
        mode: OperationMode::TryInstall,
        exit_code: Some(1),
        tolerated: true,
        failure,
    });
    assert_eq!(fatal.log_level(), tracing::Level::ERROR);
    assert_eq!(tolerated.log_level(), tracing::Level::WARN);
    assert_eq!(fatal.log_target(), "rootstrap::events::batch");
}

#[test]
fn events_serialize_with_domain_tag() {
    let event = AppEvent::Platform(PlatformEvent::ProcessKilled {
        command: "pacman".into(),
    });
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["domain"], "platform");
    assert_eq!(json["event"]["event_type"], "process_killed");

    let message = EventMessage::from_event(AppEvent::Batch(BatchEvent::Skipped {
        batch: 2,
        mode: OperationMode::Remove,
    }));
    let json = serde_json::to_value(&message).unwrap();
    assert_eq!(json["event"]["event"]["mode"], "remove");
    assert_eq!(json["meta"]["source"], "batch");
}
