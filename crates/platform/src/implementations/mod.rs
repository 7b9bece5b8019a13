//! Host implementations of the platform traits

pub mod linux;
