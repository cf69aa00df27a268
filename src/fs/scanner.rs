//! Input discovery for batch hashing
//!
//! Expands files and directory trees into a flat, sorted list of regular
//! files with hidden-file and glob filtering.

use crate::error::{QuickXorError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A regular file found by the scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Absolute path to the file
    pub path: PathBuf,
    /// Path relative to the scanned root (the file name for a file root)
    pub relative_path: PathBuf,
    /// File size in bytes at scan time
    pub size: u64,
}

impl FileEntry {
    /// Relative path with forward slashes, as stored in manifests
    pub fn manifest_path(&self) -> String {
        self.relative_path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Result of a scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Root path that was scanned
    pub root: PathBuf,
    /// Regular files, sorted by relative path
    pub files: Vec<FileEntry>,
    /// Total size of all files
    pub total_size: u64,
    /// Entries that could not be read, as (path, message)
    pub errors: Vec<(String, String)>,
}

impl ScanResult {
    /// Number of files found
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Fail if any entry under the root could not be read
    pub fn ensure_complete(&self) -> Result<()> {
        match self.errors.first() {
            None => Ok(()),
            Some((path, message)) => Err(QuickXorError::ScanIncomplete {
                root: self.root.clone(),
                count: self.errors.len(),
                first: format!("{}: {}", path, message),
            }),
        }
    }
}

/// Configuration for scanning
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Follow symbolic links
    pub follow_symlinks: bool,
    /// Include hidden files and directories
    pub include_hidden: bool,
    /// Exclude patterns, matched against the relative path
    pub exclude_patterns: Vec<String>,
}

/// Directory scanner
pub struct Scanner {
    config: ScanConfig,
    exclude_matcher: GlobSet,
}

impl Scanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Result<Self> {
        let exclude_matcher = Self::build_globset(&config.exclude_patterns)?;

        Ok(Self {
            config,
            exclude_matcher,
        })
    }

    fn build_globset(patterns: &[String]) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| {
                QuickXorError::ConfigError(format!("Invalid glob pattern '{}': {}", pattern, e))
            })?;
            builder.add(glob);
        }
        builder
            .build()
            .map_err(|e| QuickXorError::ConfigError(format!("Failed to build glob set: {}", e)))
    }

    /// Scan a file or directory tree
    pub fn scan(&self, root: &Path) -> Result<ScanResult> {
        if !root.exists() {
            return Err(QuickXorError::NotFound(root.to_path_buf()));
        }

        let root = root
            .canonicalize()
            .map_err(|e| QuickXorError::io(root, e))?;

        let include_hidden = self.config.include_hidden;
        let walker = WalkDir::new(&root)
            .follow_links(self.config.follow_symlinks)
            .into_iter()
            .filter_entry(|e| include_hidden || e.depth() == 0 || !is_hidden(e));

        let mut files = Vec::new();
        let mut errors = Vec::new();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| root.display().to_string());
                    tracing::warn!("Unreadable entry {}: {}", path, err);
                    errors.push((path, err.to_string()));
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            match self.process_entry(&entry, &root) {
                Ok(Some(file)) => files.push(file),
                Ok(None) => {}
                Err(err) => errors.push((entry.path().display().to_string(), err.to_string())),
            }
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        let total_size = files.iter().map(|f| f.size).sum();

        tracing::debug!("Scanned {:?}: {} files, {} bytes", root, files.len(), total_size);

        Ok(ScanResult {
            root,
            files,
            total_size,
            errors,
        })
    }

    fn process_entry(&self, entry: &DirEntry, root: &Path) -> Result<Option<FileEntry>> {
        let path = entry.path();

        let relative_path = if entry.depth() == 0 {
            PathBuf::from(entry.file_name())
        } else {
            path.strip_prefix(root).unwrap_or(path).to_path_buf()
        };

        if self.exclude_matcher.is_match(&relative_path) {
            return Ok(None);
        }

        let metadata = entry
            .metadata()
            .map_err(|e| QuickXorError::io(path, std::io::Error::from(e)))?;

        Ok(Some(FileEntry {
            path: path.to_path_buf(),
            relative_path,
            size: metadata.len(),
        }))
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();

        fs::write(dir.path().join("small.txt"), b"small file").unwrap();
        fs::write(dir.path().join("medium.bin"), vec![0u8; 1024 * 100]).unwrap();
        fs::create_dir(dir.path().join("subdir")).unwrap();
        fs::write(dir.path().join("subdir/nested.txt"), b"nested").unwrap();
        fs::write(dir.path().join(".hidden"), b"hidden").unwrap();

        dir
    }

    #[test]
    fn test_scanner_basic() {
        let dir = create_test_dir();
        let scanner = Scanner::new(ScanConfig::default()).unwrap();

        let result = scanner.scan(dir.path()).unwrap();

        let names: Vec<String> = result.files.iter().map(|f| f.manifest_path()).collect();
        assert_eq!(names, vec!["medium.bin", "small.txt", "subdir/nested.txt"]);
        assert_eq!(result.total_size, 1024 * 100 + 10 + 6);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_scanner_with_hidden() {
        let dir = create_test_dir();
        let config = ScanConfig {
            include_hidden: true,
            ..Default::default()
        };
        let scanner = Scanner::new(config).unwrap();

        let result = scanner.scan(dir.path()).unwrap();
        assert!(result.files.iter().any(|f| f.manifest_path() == ".hidden"));
        assert_eq!(result.file_count(), 4);
    }

    #[test]
    fn test_scanner_exclude_pattern() {
        let dir = create_test_dir();
        let config = ScanConfig {
            exclude_patterns: vec!["*.bin".to_string()],
            ..Default::default()
        };
        let scanner = Scanner::new(config).unwrap();

        let result = scanner.scan(dir.path()).unwrap();
        assert!(!result.files.iter().any(|f| f.manifest_path().ends_with(".bin")));
        assert_eq!(result.file_count(), 2);
    }

    #[test]
    fn test_scanner_single_file() {
        let dir = create_test_dir();
        let scanner = Scanner::new(ScanConfig::default()).unwrap();

        let result = scanner.scan(&dir.path().join("small.txt")).unwrap();
        assert_eq!(result.file_count(), 1);
        assert_eq!(result.files[0].manifest_path(), "small.txt");
        assert_eq!(result.files[0].size, 10);
    }

    #[test]
    fn test_scanner_errors() {
        assert!(matches!(
            Scanner::new(ScanConfig {
                exclude_patterns: vec!["a[".to_string()],
                ..Default::default()
            }),
            Err(QuickXorError::ConfigError(_))
        ));

        let dir = TempDir::new().unwrap();
        let scanner = Scanner::new(ScanConfig::default()).unwrap();
        assert!(matches!(
            scanner.scan(&dir.path().join("nope")),
            Err(QuickXorError::NotFound(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_scanner_records_dangling_link() {
        let dir = create_test_dir();
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), dir.path().join("link.txt"))
            .unwrap();

        let scanner = Scanner::new(ScanConfig {
            follow_symlinks: true,
            ..Default::default()
        })
        .unwrap();
        let result = scanner.scan(dir.path()).unwrap();

        assert_eq!(result.file_count(), 3);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].0.ends_with("link.txt"));
        assert!(matches!(
            result.ensure_complete(),
            Err(QuickXorError::ScanIncomplete { count: 1, .. })
        ));

        let complete = Scanner::new(ScanConfig::default())
            .unwrap()
            .scan(dir.path())
            .unwrap();
        assert!(complete.ensure_complete().is_ok());
    }
}
