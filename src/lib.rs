//! # QuickXorHash - Streaming Content Fingerprints
//!
//! QuickXorHash is the fast, non-cryptographic 160-bit checksum that cloud
//! storage and sync services use to fingerprint file content. Bytes are XOR
//! folded into a 160-bit ring at a position that advances 11 bits per byte,
//! and the total length is mixed into the digest at the end.
//!
//! ## Features
//!
//! - **Streaming**: feed data in chunks of any size; chunking never changes the digest
//! - **Batched fold**: work per update is bounded by the ring width, not the chunk length
//! - **Ecosystem traits**: `std::io::Write` and RustCrypto `digest::Digest`
//! - **Integrity verification**: files, readers, parallel batches and manifests
//!
//! Not a cryptographic hash: no preimage or collision resistance is offered.
//!
//! ## Quick Start
//!
//! ```
//! use quickxorhash::hash::QuickXorHash;
//!
//! let mut hasher = QuickXorHash::new();
//! hasher.update(b"Hello, ");
//! hasher.update(b"World!");
//!
//! let digest = hasher.finalize();
//! assert_eq!(digest.to_base64(), "SCgDG9jwBhaA4ApvnQMbyBACAAA=");
//! ```
//!
//! ## Hashing Files
//!
//! ```no_run
//! use quickxorhash::hash::{compute_quickxor_hash, hash_file};
//! use std::path::Path;
//!
//! let result = hash_file(Path::new("/data/video.mp4")).unwrap();
//! println!("{} ({} bytes)", result.hash, result.size);
//!
//! let file = std::fs::File::open("/data/video.mp4").unwrap();
//! let base64 = compute_quickxor_hash(file).unwrap();
//! assert_eq!(base64, result.hash.to_base64());
//! ```
//!
//! ## Batch Hashing and Manifests
//!
//! ```no_run
//! use quickxorhash::config::HashConfig;
//! use quickxorhash::core::BatchHasher;
//! use quickxorhash::fs::{ScanConfig, Scanner};
//! use quickxorhash::hash::HashManifest;
//! use std::path::{Path, PathBuf};
//!
//! let result = BatchHasher::new(HashConfig::default())
//!     .execute(&[PathBuf::from("/data")])
//!     .unwrap();
//! result.print_summary();
//!
//! let scan = Scanner::new(ScanConfig::default()).unwrap().scan(Path::new("/data")).unwrap();
//! let manifest = HashManifest::from_scan(&scan).unwrap();
//! manifest.save(Path::new("/tmp/data.qxor.json")).unwrap();
//! assert!(manifest.verify(Path::new("/data")).is_success());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod error;
pub mod fs;
pub mod hash;
pub mod progress;

// Re-export commonly used types
pub use config::HashConfig;
pub use core::{BatchHasher, BatchResult};
pub use error::{QuickXorError, Result};
pub use hash::{QuickXorDigest, QuickXorHash};
pub use progress::ProgressReporter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use quickxorhash::prelude::*;
    //! ```

    pub use crate::config::{HashConfig, OutputFormat};
    pub use crate::core::{BatchHasher, BatchResult};
    pub use crate::error::{QuickXorError, Result};
    pub use crate::fs::{FileEntry, ScanConfig, Scanner};
    pub use crate::hash::{
        compute_quickxor_hash, hash_bytes, hash_file, verify_files_match, HashManifest,
        HashResult, HashingReader, QuickXorDigest, QuickXorHash,
    };
    pub use crate::progress::ProgressReporter;
}
