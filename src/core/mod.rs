//! Core batch engine module
//!
//! Orchestrates parallel hashing of many files with progress reporting.

mod batch;

pub use batch::*;
