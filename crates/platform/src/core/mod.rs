//! Core platform abstractions and context management

use rootstrap_events::{EventEmitter, EventSender};
use std::collections::HashMap;
use std::sync::Arc;

use crate::process::{CommandOutput, LineSource, PlatformCommand, ProcessOperations};
use rootstrap_errors::Error;

/// Context for platform operations, providing event emission and metadata tracking
#[derive(Clone, Default)]
pub struct PlatformContext {
    event_sender: Option<EventSender>,
    operation_metadata: HashMap<String, String>,
}

impl PlatformContext {
    /// Create a new platform context with event emission capabilities
    #[must_use]
    pub fn new(event_sender: Option<EventSender>) -> Self {
        Self {
            event_sender,
            operation_metadata: HashMap::new(),
        }
    }

    /// Add custom metadata to the context
    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.operation_metadata.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.operation_metadata
    }
}

impl EventEmitter for PlatformContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }

    fn correlation_id(&self) -> Option<String> {
        self.operation_metadata.get("run_id").cloned()
    }
}

/// Entry point to the platform operations available on this host
#[derive(Clone)]
pub struct Platform {
    process_ops: Arc<dyn ProcessOperations>,
}

impl Platform {
    /// Create a new platform instance with the specified implementation
    #[must_use]
    pub fn new(process_ops: Arc<dyn ProcessOperations>) -> Self {
        Self { process_ops }
    }

    /// The platform backed by real child processes
    #[must_use]
    pub fn current() -> Self {
        Self::new(Arc::new(
            crate::implementations::linux::LinuxProcessOperations::new(),
        ))
    }

    /// Access process operations
    #[must_use]
    pub fn process(&self) -> &dyn ProcessOperations {
        &*self.process_ops
    }

    /// Convenience method: Start a command and stream its stdout
    ///
    /// # Errors
    ///
    /// Returns a launch error if the program cannot be started.
    pub async fn spawn_lines(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<Box<dyn LineSource>, Error> {
        self.process().spawn_lines(ctx, cmd).await
    }

    /// Convenience method: Execute a command and get output
    ///
    /// # Errors
    ///
    /// Returns a launch error if the program cannot be started.
    pub async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, Error> {
        self.process().execute_command(ctx, cmd).await
    }
}
