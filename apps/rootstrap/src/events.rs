//! Event handling and progress display

use console::{Style, Term};
use rootstrap_events::{
    AppEvent, BatchEvent, EventMessage, GeneralEvent, PlatformEvent, ProgressEvent,
};

/// Renders run events on stderr as status lines plus a live progress line
pub struct EventHandler {
    term: Term,
    colors: bool,
    debug: bool,
    /// Whether the progress line currently occupies the cursor line
    progress_visible: bool,
    label: String,
    fraction: f64,
}

impl EventHandler {
    pub fn new(colors: bool, debug: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors,
            debug,
            progress_visible: false,
            label: String::new(),
            fraction: 0.0,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, message: EventMessage) {
        crate::logging::log_event_with_tracing(&message);

        match message.event {
            AppEvent::Batch(event) => self.handle_batch_event(event),
            AppEvent::Progress(ProgressEvent::Updated { fraction }) => {
                self.fraction = fraction;
                self.draw_progress();
            }
            AppEvent::Progress(ProgressEvent::Completed { success, .. }) => {
                self.clear_progress();
                if success {
                    self.show_success("All batches completed");
                }
            }
            AppEvent::General(GeneralEvent::Warning { message, context }) => {
                let text = match context {
                    Some(context) => format!("{message} ({context})"),
                    None => message,
                };
                self.show_warning(&text);
            }
            AppEvent::General(GeneralEvent::Error { message, details }) => {
                let text = match details {
                    Some(details) => format!("{message}: {details}"),
                    None => message,
                };
                self.show_error(&text);
            }
            AppEvent::General(GeneralEvent::DebugLog { message, .. }) if self.debug => {
                self.show_status(&message);
            }
            AppEvent::Platform(PlatformEvent::LineSkipped { command, bytes }) if self.debug => {
                self.show_warning(&format!("skipped {bytes} undecodable bytes from {command}"));
            }
            _ => {}
        }
    }

    fn handle_batch_event(&mut self, event: BatchEvent) {
        match event {
            BatchEvent::Started { mode, packages, .. } => {
                self.fraction = 0.0;
                self.label = format!("{mode}");
                self.show_heading(&format!("{mode}: {packages} package(s)"));
            }
            BatchEvent::Skipped { mode, .. } if self.debug => {
                self.show_status(&format!("{mode}: nothing to do"));
            }
            BatchEvent::DownloadStarted {
                package,
                downloaded,
                total,
                ..
            } => {
                self.label = format!("downloading {package} ({downloaded}/{total})");
                self.draw_progress();
            }
            BatchEvent::InstallStarted {
                package,
                installed,
                total,
                ..
            } => {
                self.label = format!("installing {package} ({installed}/{total})");
                self.draw_progress();
            }
            BatchEvent::Succeeded {
                mode, duration_ms, ..
            } => {
                self.show_success(&format!("{mode} finished in {duration_ms} ms"));
            }
            BatchEvent::Failed {
                failure, tolerated, ..
            } => {
                if tolerated {
                    self.show_warning(&format!("{} (continuing)", failure.message));
                } else {
                    self.show_error(&failure.message);
                }
            }
            BatchEvent::KeyringStepFailed { step, failure } => {
                self.show_warning(&format!("keyring {step}: {}", failure.message));
            }
            BatchEvent::KeyringStepCompleted { step } if self.debug => {
                self.show_status(&format!("keyring {step} done"));
            }
            _ => {}
        }
    }

    fn draw_progress(&mut self) {
        if !self.term.is_term() {
            return;
        }
        let percent = (self.fraction.clamp(0.0, 1.0) * 100.0).round();
        let line = format!("[{percent:>3}%] {}", self.label);
        let _ = self.term.clear_line();
        let _ = self.term.write_str(&line);
        self.progress_visible = true;
    }

    fn clear_progress(&mut self) {
        if self.progress_visible {
            let _ = self.term.clear_line();
            self.progress_visible = false;
        }
    }

    fn print_line(&mut self, style: &Style, text: &str) {
        let restore = self.progress_visible;
        self.clear_progress();
        let text = if self.colors {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        };
        let _ = self.term.write_line(&text);
        if restore {
            self.draw_progress();
        }
    }

    fn show_heading(&mut self, message: &str) {
        self.print_line(&Style::new().bold(), &format!("==> {message}"));
    }

    fn show_status(&mut self, message: &str) {
        self.print_line(&Style::new().dim(), message);
    }

    fn show_success(&mut self, message: &str) {
        self.print_line(&Style::new().green(), message);
    }

    fn show_warning(&mut self, message: &str) {
        self.print_line(&Style::new().yellow(), &format!("warning: {message}"));
    }

    fn show_error(&mut self, message: &str) {
        self.print_line(&Style::new().red().bold(), &format!("error: {message}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rootstrap_events::FailureContext;
    use rootstrap_types::OperationMode;

    #[test]
    fn handles_a_batch_lifecycle_without_a_terminal() {
        let mut handler = EventHandler::new(false, true);
        let events = [
            AppEvent::Batch(BatchEvent::Started {
                batch: 0,
                mode: OperationMode::Install,
                packages: 1,
            }),
            AppEvent::Batch(BatchEvent::InstallStarted {
                batch: 0,
                package: "base".into(),
                installed: 1,
                total: 1,
            }),
            AppEvent::Progress(ProgressEvent::Updated { fraction: 1.0 }),
            AppEvent::Batch(BatchEvent::Failed {
                batch: 0,
                mode: OperationMode::Install,
                exit_code: Some(1),
                tolerated: false,
                failure: FailureContext::new(None::<String>, "install batch failed", None::<String>, true),
            }),
        ];
        for event in events {
            handler.handle_event(EventMessage::from_event(event));
        }
        assert_eq!(handler.label, "installing base (1/1)");
        assert_eq!(handler.fraction, 1.0);
    }
}
