//! File system module
//!
//! Discovers the files a batch run or manifest should cover.

mod scanner;

pub use scanner::*;
