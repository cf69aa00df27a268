//! Batch hashing engine
//!
//! Scans the inputs, then hashes every file on a rayon pool with one
//! QuickXorHash engine per file.

use crate::config::HashConfig;
use crate::error::{QuickXorError, Result};
use crate::fs::{FileEntry, ScanConfig, Scanner};
use crate::hash::{hash_file_with_buffer, HashResult};
use crate::progress::ProgressReporter;
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// One hashed file
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    /// Path as found by the scanner
    pub path: PathBuf,
    /// Digest and size
    #[serde(flatten)]
    pub result: HashResult,
}

/// Batch operation result
#[derive(Debug)]
pub struct BatchResult {
    /// Hashed files, in input order
    pub entries: Vec<BatchEntry>,
    /// Failed files with their error message
    pub failures: Vec<(String, String)>,
    /// Total bytes hashed
    pub bytes_hashed: u64,
    /// Total duration
    pub duration: Duration,
    /// Average throughput in bytes/second
    pub throughput: f64,
}

impl BatchResult {
    /// Check if every file was hashed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Print summary to stderr, keeping stdout for digests
    pub fn print_summary(&self) {
        eprintln!("\n=== Hash Summary ===");
        eprintln!("Files hashed:    {}", self.entries.len());
        eprintln!("Bytes hashed:    {}", humansize::format_size(self.bytes_hashed, humansize::BINARY));
        eprintln!("Duration:        {:.2?}", self.duration);
        eprintln!("Throughput:      {}/s", humansize::format_size(self.throughput as u64, humansize::BINARY));

        if !self.failures.is_empty() {
            eprintln!("\nFailures: {}", self.failures.len());
            for (path, error) in &self.failures {
                eprintln!("  {} - {}", path, error);
            }
        }
    }
}

/// Parallel batch hasher
pub struct BatchHasher {
    config: HashConfig,
    progress: Option<ProgressReporter>,
}

impl BatchHasher {
    /// Create a new batch hasher
    pub fn new(config: HashConfig) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    /// Set progress reporter
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Hash every file under the given inputs
    pub fn execute(&self, inputs: &[PathBuf]) -> Result<BatchResult> {
        let start_time = Instant::now();

        if let Some(progress) = &self.progress {
            progress.set_status("Scanning inputs...");
        }

        let (files, mut failures) = match self.collect_files(inputs) {
            Ok(collected) => collected,
            Err(e) => {
                if let Some(progress) = &self.progress {
                    progress.abandon("Scan failed");
                }
                return Err(e);
            }
        };
        let total_bytes: u64 = files.iter().map(|f| f.size).sum();

        tracing::info!("Hashing {} files ({} bytes)", files.len(), total_bytes);

        if let Some(progress) = &self.progress {
            progress.begin(files.len() as u64, total_bytes);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.effective_threads())
            .build()
            .map_err(|e| QuickXorError::ThreadPoolError(e.to_string()))?;

        let buffer_size = self.config.buffer_size;
        let progress = &self.progress;

        let results: Vec<(FileEntry, Result<HashResult>)> = pool.install(|| {
            files
                .into_par_iter()
                .map(|entry| {
                    if let Some(progress) = progress {
                        progress.start_file(&entry.path);
                    }

                    let result = hash_file_with_buffer(&entry.path, buffer_size);

                    if let Some(progress) = progress {
                        progress.finish_file(result.as_ref().ok().map(|hashed| hashed.size));
                    }

                    (entry, result)
                })
                .collect()
        });

        let mut entries = Vec::with_capacity(results.len());
        let mut bytes_hashed = 0u64;

        for (entry, result) in results {
            match result {
                Ok(hashed) => {
                    bytes_hashed += hashed.size;
                    entries.push(BatchEntry {
                        path: entry.path,
                        result: hashed,
                    });
                }
                Err(e) if self.config.continue_on_error => {
                    tracing::warn!("Failed to hash {:?}: {}", entry.path, e);
                    if let Some(progress) = &self.progress {
                        progress.report_failure(&entry.path, &e.to_string());
                    }
                    failures.push((entry.path.to_string_lossy().to_string(), e.to_string()));
                }
                Err(e) => {
                    if let Some(progress) = &self.progress {
                        progress.abandon("Hashing failed");
                    }
                    return Err(e);
                }
            }
        }

        let duration = start_time.elapsed();
        let throughput = bytes_hashed as f64 / duration.as_secs_f64().max(f64::EPSILON);

        if let Some(progress) = &self.progress {
            progress.finish(entries.len(), failures.len());
        }

        tracing::info!(
            "Hashed {} files in {:.2?} ({} failures)",
            entries.len(),
            duration,
            failures.len()
        );

        Ok(BatchResult {
            entries,
            failures,
            bytes_hashed,
            duration,
            throughput,
        })
    }

    /// Expand inputs into files, preserving input order
    ///
    /// Unreadable entries abort the batch unless `continue_on_error` is set,
    /// in which case they are returned as failures.
    fn collect_files(
        &self,
        inputs: &[PathBuf],
    ) -> Result<(Vec<FileEntry>, Vec<(String, String)>)> {
        let scanner = Scanner::new(ScanConfig {
            follow_symlinks: self.config.follow_symlinks,
            include_hidden: self.config.include_hidden,
            exclude_patterns: self.config.exclude_patterns.clone(),
        })?;

        let mut files = Vec::new();
        let mut failures = Vec::new();
        for input in inputs {
            match scanner.scan(input) {
                Ok(scan) => {
                    if !self.config.continue_on_error {
                        scan.ensure_complete()?;
                    }
                    files.extend(scan.files);
                    failures.extend(scan.errors);
                }
                Err(e) if self.config.continue_on_error => {
                    tracing::warn!("Skipping {:?}: {}", input, e);
                    failures.push((input.to_string_lossy().to_string(), e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        Ok((files, failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash_bytes;
    use tempfile::TempDir;

    fn config() -> HashConfig {
        HashConfig {
            threads: 2,
            buffer_size: 4096,
            ..Default::default()
        }
    }

    #[test]
    fn test_batch_hashes_files_and_dirs() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("tree")).unwrap();
        std::fs::write(dir.path().join("tree/a.bin"), b"alpha").unwrap();
        std::fs::write(dir.path().join("tree/b.bin"), vec![7u8; 10_000]).unwrap();
        std::fs::write(dir.path().join("single.txt"), b"Hello, World!").unwrap();

        let hasher = BatchHasher::new(config()).with_progress(ProgressReporter::disabled());
        let result = hasher
            .execute(&[dir.path().join("single.txt"), dir.path().join("tree")])
            .unwrap();

        assert!(result.is_success());
        assert_eq!(result.entries.len(), 3);
        assert_eq!(result.bytes_hashed, 13 + 5 + 10_000);
        assert_eq!(result.entries[0].result.hash.to_base64(), "SCgDG9jwBhaA4ApvnQMbyBACAAA=");
        assert_eq!(result.entries[1].result, hash_bytes(b"alpha"));
        assert_eq!(result.entries[2].result, hash_bytes(&vec![7u8; 10_000]));
    }

    #[test]
    fn test_missing_input_aborts() {
        let dir = TempDir::new().unwrap();
        let hasher = BatchHasher::new(config());

        assert!(matches!(
            hasher.execute(&[dir.path().join("missing")]),
            Err(QuickXorError::NotFound(_))
        ));
    }

    #[test]
    fn test_continue_on_error_skips_missing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("ok.txt"), b"ok").unwrap();

        let hasher = BatchHasher::new(HashConfig {
            continue_on_error: true,
            ..config()
        });
        let result = hasher
            .execute(&[dir.path().join("missing"), dir.path().join("ok.txt")])
            .unwrap();

        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].result, hash_bytes(b"ok"));
        assert_eq!(result.failures.len(), 1);
        assert!(!result.is_success());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_tree_entry_is_not_dropped() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"alpha").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), dir.path().join("b.txt"))
            .unwrap();

        let strict = BatchHasher::new(HashConfig {
            follow_symlinks: true,
            ..config()
        })
        .with_progress(ProgressReporter::disabled());
        assert!(matches!(
            strict.execute(&[dir.path().to_path_buf()]),
            Err(QuickXorError::ScanIncomplete { count: 1, .. })
        ));

        let lenient = BatchHasher::new(HashConfig {
            follow_symlinks: true,
            continue_on_error: true,
            ..config()
        });
        let result = lenient.execute(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.failures.len(), 1);
        assert!(result.failures[0].0.ends_with("b.txt"));
        assert!(!result.is_success());
    }

    #[test]
    fn test_entry_serializes_flat() {
        let entry = BatchEntry {
            path: PathBuf::from("x.bin"),
            result: hash_bytes(b"J"),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["hash"], "SgAAAAAAAAAAAAAAAQAAAAAAAAA=");
        assert_eq!(json["size"], 1);
    }
}
