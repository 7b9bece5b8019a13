//! Child processes with line-by-line stdout streaming

use async_trait::async_trait;
use rootstrap_errors::{Error, PlatformError};
use rootstrap_events::{AppEvent, EventEmitter, FailureContext, PlatformEvent};
use std::convert::TryFrom;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, warn};

use crate::core::PlatformContext;
use crate::process::{CommandOutput, LineSource, PlatformCommand, ProcessOperations};

/// Process operations backed by real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct LinuxProcessOperations;

impl LinuxProcessOperations {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn build_command(cmd: &PlatformCommand) -> Command {
    let mut command = Command::new(cmd.program());
    command.args(cmd.get_args());

    for (key, value) in cmd.get_env_vars() {
        command.env(key, value);
    }
    command
}

fn emit_launched(ctx: &PlatformContext, cmd: &PlatformCommand) {
    ctx.emit(AppEvent::Platform(PlatformEvent::ProcessLaunched {
        command: cmd.program().to_string(),
        args: cmd.get_args().to_vec(),
    }));
}

fn launch_failed(ctx: &PlatformContext, cmd: &PlatformCommand, err: &std::io::Error) -> Error {
    let error = PlatformError::from_spawn(cmd.program(), err);
    warn!(command = %cmd, error = %error, "failed to launch process");
    ctx.emit(AppEvent::Platform(PlatformEvent::LaunchFailed {
        command: cmd.program().to_string(),
        failure: FailureContext::from_error(&error),
    }));
    error.into()
}

#[async_trait]
impl ProcessOperations for LinuxProcessOperations {
    async fn spawn_lines(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<Box<dyn LineSource>, Error> {
        let mut command = build_command(&cmd);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|e| launch_failed(ctx, &cmd, &e))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| PlatformError::LaunchFailed {
                command: cmd.program().to_string(),
                message: "stdout was not captured".to_string(),
            })?;

        debug!(command = %cmd, pid = ?child.id(), "process launched");
        emit_launched(ctx, &cmd);

        Ok(Box::new(ChildLineSource {
            ctx: ctx.clone(),
            command: cmd.program().to_string(),
            child,
            stdout: Some(BufReader::new(stdout)),
            buf: Vec::new(),
            lines: 0,
            started: Instant::now(),
        }))
    }

    async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, Error> {
        let start = Instant::now();
        let mut command = build_command(&cmd);
        command.stdin(Stdio::null());

        // spawn first so launch errors keep their taxonomy
        let child = command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| launch_failed(ctx, &cmd, &e))?;
        emit_launched(ctx, &cmd);

        let output =
            child
                .wait_with_output()
                .await
                .map_err(|e| PlatformError::ProcessExecutionFailed {
                    command: cmd.program().to_string(),
                    message: e.to_string(),
                })?;

        let exit_code = output.status.code();
        debug!(command = %cmd, ?exit_code, "process finished");
        ctx.emit(AppEvent::Platform(PlatformEvent::ProcessExited {
            command: cmd.program().to_string(),
            exit_code,
            lines: 0,
            duration_ms: duration_to_millis(start.elapsed()),
        }));

        Ok(CommandOutput {
            exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Stdout of a spawned child, split on `\n`.
///
/// A trailing `\r` is stripped along with the newline. Lines that are not
/// valid UTF-8 are logged, reported as `PlatformEvent::LineSkipped` and
/// dropped. The child is killed if the source is dropped while it still runs.
pub struct ChildLineSource {
    ctx: PlatformContext,
    command: String,
    child: Child,
    stdout: Option<BufReader<ChildStdout>>,
    buf: Vec<u8>,
    lines: u64,
    started: Instant,
}

impl ChildLineSource {
    fn exec_failed(&self, err: &std::io::Error) -> Error {
        PlatformError::ProcessExecutionFailed {
            command: self.command.clone(),
            message: err.to_string(),
        }
        .into()
    }
}

#[async_trait]
impl LineSource for ChildLineSource {
    async fn next_line(&mut self) -> Result<Option<String>, Error> {
        loop {
            let Some(reader) = self.stdout.as_mut() else {
                return Ok(None);
            };

            self.buf.clear();
            let read = match reader.read_until(b'\n', &mut self.buf).await {
                Ok(read) => read,
                Err(e) => return Err(self.exec_failed(&e)),
            };
            if read == 0 {
                self.stdout = None;
                return Ok(None);
            }

            if self.buf.last() == Some(&b'\n') {
                self.buf.pop();
                if self.buf.last() == Some(&b'\r') {
                    self.buf.pop();
                }
            }

            match String::from_utf8(std::mem::take(&mut self.buf)) {
                Ok(line) => {
                    self.lines += 1;
                    return Ok(Some(line));
                }
                Err(e) => {
                    let bytes = e.as_bytes().len();
                    self.buf = e.into_bytes();
                    let error = PlatformError::StreamDecodingFailed {
                        command: self.command.clone(),
                        bytes,
                    };
                    warn!(error = %error, "skipping output line");
                    self.ctx
                        .emit(AppEvent::Platform(PlatformEvent::LineSkipped {
                            command: self.command.clone(),
                            bytes,
                        }));
                }
            }
        }
    }

    async fn wait(&mut self) -> Result<Option<i32>, Error> {
        // Stdout is finished with; closing it keeps a chatty child from blocking on a full pipe.
        self.stdout = None;
        let status = match self.child.wait().await {
            Ok(status) => status,
            Err(e) => return Err(self.exec_failed(&e)),
        };

        let exit_code = status.code();
        debug!(command = %self.command, ?exit_code, lines = self.lines, "process exited");
        self.ctx.emit(AppEvent::Platform(PlatformEvent::ProcessExited {
            command: self.command.clone(),
            exit_code,
            lines: self.lines,
            duration_ms: duration_to_millis(self.started.elapsed()),
        }));
        Ok(exit_code)
    }

    async fn kill(&mut self) -> Result<(), Error> {
        if matches!(self.child.try_wait(), Ok(Some(_))) {
            debug!(command = %self.command, "process already exited; nothing to kill");
            return Ok(());
        }

        self.child
            .kill()
            .await
            .map_err(|e| PlatformError::KillFailed {
                command: self.command.clone(),
                message: e.to_string(),
            })?;

        debug!(command = %self.command, "process killed");
        self.ctx.emit(AppEvent::Platform(PlatformEvent::ProcessKilled {
            command: self.command.clone(),
        }));
        Ok(())
    }
}
