#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for rootstrap
//!
//! This crate provides the data model shared by the runner, the CLI and
//! the event system: operation modes, package records, the ordered
//! operation plan, and the reports produced once a plan has run.

pub mod operation;
pub mod reports;

pub use operation::{Operation, OperationMode, OperationPlan, PackageRecord};
pub use reports::{BatchOutcome, BatchReport, KeyringReport, RunReport};

