//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use rootstrap_ops::{OperationResult, Replay};
use rootstrap_progress::ClassifiedEvent;
use rootstrap_types::{BatchOutcome, RunReport};
use std::io;

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    colors: bool,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, colors: bool) -> Self {
        Self {
            json_output,
            colors,
        }
    }

    /// Render operation result
    pub fn render_result(&self, result: &OperationResult) -> io::Result<()> {
        if self.json_output {
            self.render_json(result)
        } else {
            self.render_table(result)
        }
    }

    /// Render as JSON
    fn render_json(&self, result: &OperationResult) -> io::Result<()> {
        let json = result.to_json().map_err(io::Error::other)?;
        println!("{json}");
        Ok(())
    }

    /// Render as formatted table
    fn render_table(&self, result: &OperationResult) -> io::Result<()> {
        match result {
            OperationResult::Run(report) => self.render_run_report(report),
            OperationResult::Replay(replay) => self.render_replay(replay),
        }
        Ok(())
    }

    fn new_table(&self, headers: &[&str]) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if !self.colors {
            table.force_no_tty();
        }
        table.set_header(
            headers
                .iter()
                .map(|header| Cell::new(header).add_attribute(Attribute::Bold)),
        );
        table
    }

    fn render_run_report(&self, report: &RunReport) {
        let mut table = self.new_table(&[
            "Mode", "Packages", "Outcome", "Exit", "Downloaded", "Installed", "Progress", "Time",
        ]);

        for batch in &report.batches {
            let (outcome, color) = match batch.outcome {
                BatchOutcome::Succeeded => ("succeeded", Color::Green),
                BatchOutcome::Failed => ("failed", Color::Red),
                BatchOutcome::TimedOut => ("timed out", Color::Red),
                BatchOutcome::FailedTolerated => ("failed (tolerated)", Color::Yellow),
                BatchOutcome::Skipped => ("skipped", Color::DarkGrey),
                BatchOutcome::NotAttempted => ("not attempted", Color::DarkGrey),
            };
            let exit = batch
                .exit_code
                .map_or_else(|| "-".to_string(), |code| code.to_string());

            table.add_row(vec![
                Cell::new(batch.mode),
                Cell::new(batch.packages),
                Cell::new(outcome).fg(color),
                Cell::new(exit),
                Cell::new(format!("{}/{}", batch.downloaded, batch.total)),
                Cell::new(format!("{}/{}", batch.installed, batch.total)),
                Cell::new(format!("{:.0}%", batch.final_progress * 100.0)),
                Cell::new(format!("{} ms", batch.duration_ms)),
            ]);
        }
        println!("{table}");

        for step in &report.keyring {
            match &step.message {
                None => println!("keyring {}: ok", step.step),
                Some(message) => println!("keyring {}: failed ({message})", step.step),
            }
        }

        if report.aborted {
            println!("Run aborted after {} ms", report.duration_ms);
        } else {
            println!("Run completed in {} ms", report.duration_ms);
        }
    }

    fn render_replay(&self, replay: &Replay) {
        let mut table = self.new_table(&["Line", "Event", "Accepted", "Progress"]);
        for step in &replay.steps {
            let event = match &step.event {
                ClassifiedEvent::TotalAnnounced(total) => format!("total {total}"),
                ClassifiedEvent::DownloadStarted(name) => format!("download {name}"),
                ClassifiedEvent::InstallStarted(name) => format!("install {name}"),
                ClassifiedEvent::Unrecognized => "unrecognized".to_string(),
            };
            let accepted = if step.accepted { "yes" } else { "duplicate" };
            table.add_row(vec![
                Cell::new(step.line),
                Cell::new(event),
                Cell::new(accepted),
                Cell::new(format!("{:.4}", step.progress)),
            ]);
        }
        println!("{table}");
        println!(
            "{} lines, {} unrecognized, {} undecodable; total {}, downloaded {}, installed {}, progress {:.4}",
            replay.lines,
            replay.unrecognized,
            replay.skipped,
            replay.state.total,
            replay.state.downloaded,
            replay.state.installed,
            replay.state.progress
        );
    }
}
