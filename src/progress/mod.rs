//! Progress reporting module
//!
//! Real-time progress for batch hashing: file count, bytes and throughput.

mod reporter;

pub use reporter::*;
