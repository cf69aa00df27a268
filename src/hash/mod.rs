//! QuickXorHash computation and integrity verification module
//!
//! The engine folds bytes into a 160-bit XOR ring; the surrounding modules
//! stream files through it, verify content and keep manifests.

mod integrity;
mod manifest;
mod output;
mod quickxor;

pub use integrity::*;
pub use manifest::*;
pub use output::*;
pub use quickxor::*;
