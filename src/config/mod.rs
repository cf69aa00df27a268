//! Configuration module for qxorsum
//!
//! Provides CLI arguments and the runtime hashing configuration.

mod settings;

pub use settings::*;
