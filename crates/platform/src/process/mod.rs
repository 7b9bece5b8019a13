//! Process execution operations

use async_trait::async_trait;
use rootstrap_errors::Error;
use std::fmt;

use crate::core::PlatformContext;

/// Platform-specific command builder and execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCommand {
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
}

impl PlatformCommand {
    /// Create a new platform command
    #[must_use]
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Add an argument to the command
    pub fn arg<S: AsRef<str>>(&mut self, arg: S) -> &mut Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Add multiple arguments to the command
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_string());
        }
        self
    }

    /// Set an environment variable for the child; later values win
    pub fn env<K: AsRef<str>, V: AsRef<str>>(&mut self, key: K, value: V) -> &mut Self {
        let key = key.as_ref().to_string();
        self.env.retain(|(existing, _)| *existing != key);
        self.env.push((key, value.as_ref().to_string()));
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Environment overrides on top of the inherited environment
    #[must_use]
    pub fn get_env_vars(&self) -> &[(String, String)] {
        &self.env
    }
}

impl fmt::Display for PlatformCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Output from command execution
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// A running child whose standard output is consumed one line at a time.
///
/// Lines come back in the order the child wrote them, without their line
/// terminator. Lines that are not valid UTF-8 are skipped by the
/// implementation rather than surfaced as errors.
#[async_trait]
pub trait LineSource: Send {
    /// Next line of output, or `None` once the child closed its stdout
    async fn next_line(&mut self) -> Result<Option<String>, Error>;

    /// Wait for the child to exit. Call after `next_line` returned `None`.
    ///
    /// Returns the exit code, or `None` if the child died from a signal.
    async fn wait(&mut self) -> Result<Option<i32>, Error>;

    /// Forcefully terminate the child. A no-op if it has already exited.
    async fn kill(&mut self) -> Result<(), Error>;
}

/// Trait for process execution operations
#[async_trait]
pub trait ProcessOperations: Send + Sync {
    /// Start `cmd` with stdout piped and return its line stream.
    ///
    /// Fails with `PlatformError::LaunchFailed` or `CommandNotFound` before
    /// any line is produced if the program cannot be started.
    async fn spawn_lines(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<Box<dyn LineSource>, Error>;

    /// Run a command to completion and collect its output
    async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_replace_earlier_values() {
        let mut cmd = PlatformCommand::new("pacman");
        cmd.env("LC_ALL", "en_US.UTF-8").env("LC_ALL", "C").arg("-Sy");
        assert_eq!(
            cmd.get_env_vars(),
            &[("LC_ALL".to_string(), "C".to_string())]
        );
        assert_eq!(cmd.to_string(), "pacman -Sy");
    }

    #[test]
    fn success_requires_zero_exit() {
        let ok = CommandOutput {
            exit_code: Some(0),
            ..CommandOutput::default()
        };
        let signalled = CommandOutput::default();
        assert!(ok.success());
        assert!(!signalled.success());
    }
}
