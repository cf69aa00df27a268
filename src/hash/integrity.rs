//! Integrity verification with QuickXorHash
//!
//! Streams byte sources through the engine. A read failure aborts the whole
//! computation: a digest of a partial read is never returned.

use super::output::QuickXorDigest;
use super::quickxor::QuickXorHash;
use crate::error::{IoResultExt, QuickXorError, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Default read buffer size (1MB)
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Digest plus the number of bytes it covers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashResult {
    /// QuickXorHash digest
    pub hash: QuickXorDigest,
    /// Content size in bytes
    pub size: u64,
}

impl HashResult {
    /// Create a new hash result
    pub fn new(hash: QuickXorDigest, size: u64) -> Self {
        Self { hash, size }
    }

    /// Verify against another hash result
    pub fn verify(&self, other: &HashResult) -> bool {
        self.size == other.size && self.hash == other.hash
    }
}

impl std::fmt::Display for HashResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hash)
    }
}

/// Hash everything a reader yields
///
/// Interrupted reads are retried; any other read error is returned and the
/// partially folded state is discarded.
pub fn hash_reader<R: Read>(mut reader: R, buffer_size: usize) -> std::io::Result<HashResult> {
    let mut hasher = QuickXorHash::new();
    let mut buffer = vec![0u8; buffer_size.max(1)];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(HashResult::new(hasher.finalize(), hasher.bytes_processed()))
}

/// Hash a reader and return the base64 text form of the digest
pub fn compute_quickxor_hash<R: Read>(reader: R) -> std::io::Result<String> {
    hash_reader(reader, DEFAULT_BUFFER_SIZE).map(|result| result.hash.to_base64())
}

/// Compute hash of a file
pub fn hash_file(path: &Path) -> Result<HashResult> {
    hash_file_with_buffer(path, DEFAULT_BUFFER_SIZE)
}

/// Compute hash of a file with custom buffer size
pub fn hash_file_with_buffer(path: &Path, buffer_size: usize) -> Result<HashResult> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(QuickXorError::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(QuickXorError::io(path, e)),
    };
    let result = hash_reader(file, buffer_size).with_path(path)?;

    tracing::debug!("Hashed {:?} ({} bytes): {}", path, result.size, result.hash);
    Ok(result)
}

/// Compute hash of data in memory
pub fn hash_bytes(data: &[u8]) -> HashResult {
    HashResult::new(QuickXorHash::digest(data), data.len() as u64)
}

/// Verify file integrity against an expected result
pub fn verify_file(path: &Path, expected: &HashResult) -> Result<bool> {
    let actual = hash_file(path)?;
    Ok(actual.verify(expected))
}

/// Verify a file against an expected digest, failing on mismatch
pub fn check_file(path: &Path, expected: &QuickXorDigest) -> Result<HashResult> {
    let actual = hash_file(path)?;

    if actual.hash != *expected {
        return Err(QuickXorError::integrity_mismatch(
            path,
            expected.to_base64(),
            actual.hash.to_base64(),
        ));
    }

    Ok(actual)
}

/// Verify two files have identical content
pub fn verify_files_match(source: &Path, dest: &Path) -> Result<VerificationResult> {
    let source_hash = hash_file(source)?;
    let dest_hash = hash_file(dest)?;

    let matches = source_hash.verify(&dest_hash);

    Ok(VerificationResult {
        source_hash,
        dest_hash,
        matches,
    })
}

/// Result of verifying two files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Hash of the source file
    pub source_hash: HashResult,
    /// Hash of the destination file
    pub dest_hash: HashResult,
    /// Whether the hashes match
    pub matches: bool,
}

/// Batch hash multiple files in parallel, one engine per file
pub fn hash_files_parallel(paths: &[&Path]) -> Vec<Result<HashResult>> {
    paths.par_iter().map(|path| hash_file(path)).collect()
}

/// Reader adapter that hashes everything read through it
///
/// Lets a caller copy and fingerprint a stream in a single pass. Once the
/// inner reader fails with anything but `Interrupted`, `finish` refuses to
/// produce a digest.
pub struct HashingReader<R> {
    inner: R,
    hasher: QuickXorHash,
    failed: Option<ErrorKind>,
}

impl<R: Read> HashingReader<R> {
    /// Wrap a reader
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: QuickXorHash::new(),
            failed: None,
        }
    }

    /// Bytes passed through so far
    pub fn bytes_processed(&self) -> u64 {
        self.hasher.bytes_processed()
    }

    /// Finish and return the result along with the inner reader
    ///
    /// Errors if any read through the adapter failed.
    pub fn finish(self) -> std::io::Result<(HashResult, R)> {
        if let Some(kind) = self.failed {
            return Err(std::io::Error::new(
                kind,
                format!(
                    "source failed after {} bytes; no digest for a partial read",
                    self.hasher.bytes_processed()
                ),
            ));
        }

        let result = HashResult::new(self.hasher.finalize(), self.hasher.bytes_processed());
        Ok((result, self.inner))
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.inner.read(buf) {
            Ok(n) => {
                self.hasher.update(&buf[..n]);
                Ok(n)
            }
            Err(e) => {
                if e.kind() != ErrorKind::Interrupted {
                    self.failed.get_or_insert(e.kind());
                }
                Err(e)
            }
        }
    }
}

/// Measure single-engine throughput over `data_size` bytes
pub fn benchmark(data_size: usize, iterations: u32) -> (std::time::Duration, f64) {
    let data: Vec<u8> = (0..data_size).map(|i| (i % 256) as u8).collect();
    let iterations = iterations.max(1);

    let start = std::time::Instant::now();
    for _ in 0..iterations {
        std::hint::black_box(hash_bytes(std::hint::black_box(&data)));
    }

    let duration = start.elapsed() / iterations;
    let throughput = (data_size as f64) / duration.as_secs_f64().max(f64::EPSILON) / (1024.0 * 1024.0);

    (duration, throughput)
}
