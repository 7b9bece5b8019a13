//! Host process implementation on top of `tokio::process`

pub mod process;

pub use process::{ChildLineSource, LinuxProcessOperations};
