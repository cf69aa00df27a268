//! Hash manifests
//!
//! A manifest records the QuickXorHash of every file under a root so the tree
//! can be re-verified later, after a copy or a sync.

use super::integrity::{hash_file, HashResult};
use super::output::QuickXorDigest;
use crate::error::{IoResultExt, QuickXorError, Result};
use crate::fs::{FileEntry, ScanResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Hash entry for manifest files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHashEntry {
    /// Relative path, forward-slash separated
    pub path: String,
    /// File size
    pub size: u64,
    /// QuickXorHash digest
    pub hash: QuickXorDigest,
    /// Modification time (Unix timestamp)
    pub mtime: u64,
}

impl FileHashEntry {
    /// Build an entry from a scanned file and its hash
    pub fn from_result(entry: &FileEntry, result: &HashResult) -> Self {
        let mtime = std::fs::metadata(&entry.path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            path: entry.manifest_path(),
            size: result.size,
            hash: result.hash,
            mtime,
        }
    }
}

/// Collection of file hashes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashManifest {
    /// Creation timestamp
    pub created: u64,
    /// Root path
    pub root: String,
    /// File entries
    pub entries: Vec<FileHashEntry>,
}

impl HashManifest {
    /// Create a new empty manifest
    pub fn new(root: &str) -> Self {
        Self {
            created: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
            root: root.to_string(),
            entries: Vec::new(),
        }
    }

    /// Hash every scanned file in parallel and record the results
    ///
    /// Fails if the scan skipped unreadable entries or on the first file that
    /// cannot be read; a manifest never silently omits part of the tree.
    pub fn from_scan(scan: &ScanResult) -> Result<Self> {
        scan.ensure_complete()?;

        let entries = scan
            .files
            .par_iter()
            .map(|entry| {
                let result = hash_file(&entry.path)?;
                Ok(FileHashEntry::from_result(entry, &result))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut manifest = Self::new(&scan.root.to_string_lossy());
        manifest.entries = entries;
        Ok(manifest)
    }

    /// Add a file entry
    pub fn add_entry(&mut self, entry: FileHashEntry) {
        self.entries.push(entry);
    }

    /// Find entry by path
    pub fn find_entry(&self, path: &str) -> Option<&FileHashEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// Total bytes covered by the manifest
    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }

    /// Save manifest to JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| QuickXorError::ManifestError(e.to_string()))?;
        std::fs::write(path, json).with_path(path)?;
        Ok(())
    }

    /// Load manifest from JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).with_path(path)?;
        serde_json::from_str(&json)
            .map_err(|e| QuickXorError::ManifestError(format!("{}: {}", path.display(), e)))
    }

    /// Re-hash every entry relative to `root` and compare
    pub fn verify(&self, root: &Path) -> ManifestReport {
        let outcomes: Vec<(String, EntryOutcome)> = self
            .entries
            .par_iter()
            .map(|entry| {
                let Some(path) = resolve_entry(root, &entry.path) else {
                    return (
                        entry.path.clone(),
                        EntryOutcome::Failed("path escapes the manifest root".to_string()),
                    );
                };
                let outcome = match hash_file(&path) {
                    Ok(actual) if actual.hash == entry.hash && actual.size == entry.size => {
                        EntryOutcome::Matched
                    }
                    Ok(actual) => EntryOutcome::Mismatched(actual.hash),
                    Err(QuickXorError::NotFound(_)) => EntryOutcome::Missing,
                    Err(e) => EntryOutcome::Failed(e.to_string()),
                };
                (entry.path.clone(), outcome)
            })
            .collect();

        let mut report = ManifestReport::default();
        for (path, outcome) in outcomes {
            match outcome {
                EntryOutcome::Matched => report.matched += 1,
                EntryOutcome::Mismatched(actual) => {
                    tracing::warn!("Digest mismatch for {}: got {}", path, actual);
                    report.mismatched.push(path);
                }
                EntryOutcome::Missing => report.missing.push(path),
                EntryOutcome::Failed(message) => report.failed.push((path, message)),
            }
        }

        report
    }
}

/// Join a manifest path onto `root`, refusing anything but plain components
fn resolve_entry(root: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative);
    let plain = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));

    (plain && relative.components().next().is_some()).then(|| root.join(relative))
}

enum EntryOutcome {
    Matched,
    Mismatched(QuickXorDigest),
    Missing,
    Failed(String),
}

/// Outcome of verifying a manifest against a tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestReport {
    /// Entries whose content still matches
    pub matched: usize,
    /// Entries whose digest or size changed
    pub mismatched: Vec<String>,
    /// Entries no longer present
    pub missing: Vec<String>,
    /// Entries that could not be read
    pub failed: Vec<(String, String)>,
}

impl ManifestReport {
    /// Every entry matched
    pub fn is_success(&self) -> bool {
        self.mismatched.is_empty() && self.missing.is_empty() && self.failed.is_empty()
    }

    /// Print summary to console
    pub fn print_summary(&self) {
        println!("Matched:    {}", self.matched);
        println!("Mismatched: {}", self.mismatched.len());
        println!("Missing:    {}", self.missing.len());
        println!("Unreadable: {}", self.failed.len());

        for path in &self.mismatched {
            println!("  CHANGED  {}", path);
        }
        for path in &self.missing {
            println!("  MISSING  {}", path);
        }
        for (path, error) in &self.failed {
            println!("  FAILED   {} - {}", path, error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{ScanConfig, Scanner};
    use crate::hash::hash_bytes;
    use tempfile::TempDir;

    fn scanned_tree() -> (TempDir, ScanResult) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"alpha").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/b.txt"), b"Hello, World!").unwrap();

        let scan = Scanner::new(ScanConfig::default())
            .unwrap()
            .scan(dir.path())
            .unwrap();
        (dir, scan)
    }

    #[test]
    fn test_manifest_save_load() {
        let dir = TempDir::new().unwrap();
        let mut manifest = HashManifest::new("/test/root");

        manifest.add_entry(FileHashEntry {
            path: "file1.txt".to_string(),
            size: 13,
            hash: hash_bytes(b"Hello, World!").hash,
            mtime: 1234567890,
        });

        let manifest_path = dir.path().join("manifest.json");
        manifest.save(&manifest_path).unwrap();

        let json = std::fs::read_to_string(&manifest_path).unwrap();
        assert!(json.contains("SCgDG9jwBhaA4ApvnQMbyBACAAA="));

        let loaded = HashManifest::load(&manifest_path).unwrap();
        assert_eq!(loaded.entries, manifest.entries);
        assert_eq!(loaded.find_entry("file1.txt").unwrap().size, 13);
        assert!(loaded.find_entry("other.txt").is_none());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(&path, b"{ not json").unwrap();

        assert!(matches!(HashManifest::load(&path), Err(QuickXorError::ManifestError(_))));
    }

    #[test]
    fn test_from_scan_and_verify() {
        let (dir, scan) = scanned_tree();
        let manifest = HashManifest::from_scan(&scan).unwrap();

        assert_eq!(manifest.entries.len(), 2);
        assert_eq!(manifest.total_size(), 5 + 13);
        assert_eq!(
            manifest.find_entry("nested/b.txt").unwrap().hash.to_base64(),
            "SCgDG9jwBhaA4ApvnQMbyBACAAA="
        );

        let report = manifest.verify(dir.path());
        assert!(report.is_success());
        assert_eq!(report.matched, 2);
    }

    #[test]
    fn test_verify_detects_changes() {
        let (dir, scan) = scanned_tree();
        let manifest = HashManifest::from_scan(&scan).unwrap();

        std::fs::write(dir.path().join("a.txt"), b"alphA").unwrap();
        std::fs::remove_file(dir.path().join("nested/b.txt")).unwrap();

        let report = manifest.verify(dir.path());
        assert!(!report.is_success());
        assert_eq!(report.mismatched, vec!["a.txt".to_string()]);
        assert_eq!(report.missing, vec!["nested/b.txt".to_string()]);
        assert_eq!(report.matched, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_from_scan_refuses_incomplete_tree() {
        let (dir, _) = scanned_tree();
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), dir.path().join("link.txt"))
            .unwrap();

        let scan = Scanner::new(ScanConfig {
            follow_symlinks: true,
            ..Default::default()
        })
        .unwrap()
        .scan(dir.path())
        .unwrap();

        assert!(matches!(
            HashManifest::from_scan(&scan),
            Err(QuickXorError::ScanIncomplete { count: 1, .. })
        ));
    }

    #[test]
    fn test_verify_stays_inside_root() {
        let outer = TempDir::new().unwrap();
        std::fs::write(outer.path().join("secret.txt"), b"outside").unwrap();
        let root = outer.path().join("root");
        std::fs::create_dir(&root).unwrap();

        let secret = hash_bytes(b"outside");
        let mut manifest = HashManifest::new(&root.to_string_lossy());
        for path in [
            "../secret.txt".to_string(),
            outer.path().join("secret.txt").to_string_lossy().to_string(),
            String::new(),
        ] {
            manifest.add_entry(FileHashEntry {
                path,
                size: secret.size,
                hash: secret.hash,
                mtime: 0,
            });
        }

        let report = manifest.verify(&root);
        assert_eq!(report.matched, 0);
        assert_eq!(report.failed.len(), 3);
        assert!(report.failed.iter().all(|(_, msg)| msg.contains("escapes")));
    }
}
