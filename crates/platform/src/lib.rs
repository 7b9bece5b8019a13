#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Platform abstraction layer for child process operations.
//!
//! This crate provides:
//! - `PlatformCommand`, a builder describing what to run
//! - `ProcessOperations`, the seam the runner launches package-manager
//!   processes through, with a tokio-backed host implementation
//! - `LineSource`, a running child whose stdout is read line by line
//!
//! Every launch, exit and kill is reported as a `PlatformEvent` through the
//! `PlatformContext` the caller supplies.

pub mod core;
pub mod implementations;
pub mod process;

pub use crate::core::{Platform, PlatformContext};
pub use implementations::linux::{ChildLineSource, LinuxProcessOperations};
pub use process::{CommandOutput, LineSource, PlatformCommand, ProcessOperations};
