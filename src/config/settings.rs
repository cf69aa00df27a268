//! Configuration settings for qxorsum
//!
//! Defines the CLI arguments, subcommands and the runtime configuration
//! derived from them.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// qxorsum - QuickXorHash content fingerprints
#[derive(Parser, Debug, Clone)]
#[command(name = "qxorsum")]
#[command(author = "QuickXorHash Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compute and verify QuickXorHash digests")]
#[command(long_about = r#"
qxorsum computes QuickXorHash digests, the 160-bit XOR-based content hash
used by cloud storage services to fingerprint large files.

Examples:
  qxorsum file.bin                               # Print base64 digest
  qxorsum /data --threads 8 --progress           # Hash a tree in parallel
  qxorsum check file.bin OlgzOZR3SdAfb/Y/0p0IFcHuZrs=
  qxorsum manifest create /data -o data.qxor.json
  qxorsum manifest verify data.qxor.json
"#)]
pub struct CliArgs {
    /// Files or directories to hash
    #[arg(value_name = "PATHS")]
    pub paths: Vec<PathBuf>,

    /// Number of parallel threads (0 = auto-detect)
    #[arg(short = 't', long, default_value = "0", value_name = "NUM")]
    pub threads: usize,

    /// Read buffer size (e.g., 1M, 64K)
    #[arg(short = 'b', long, default_value = "1M", value_name = "SIZE")]
    pub buffer_size: String,

    /// Digest output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Show progress bars
    #[arg(short = 'p', long)]
    pub progress: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Follow symbolic links
    #[arg(short = 'L', long)]
    pub follow_symlinks: bool,

    /// Include hidden files
    #[arg(long)]
    pub include_hidden: bool,

    /// File pattern to exclude (glob)
    #[arg(long, value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Continue on errors (don't abort)
    #[arg(long)]
    pub continue_on_error: bool,

    /// Emit logs as JSON
    #[arg(long, env = "QXORSUM_LOG_JSON")]
    pub log_json: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Check a file against an expected base64 digest
    #[command(name = "check")]
    Check {
        /// File to hash
        path: PathBuf,
        /// Expected digest (base64)
        expected: String,
    },

    /// Verify two files have identical content
    #[command(name = "verify")]
    Verify {
        /// Source path
        source: PathBuf,
        /// Destination path
        destination: PathBuf,
    },

    /// Create or verify hash manifests
    #[command(name = "manifest", subcommand)]
    Manifest(ManifestCommand),

    /// Measure hashing throughput
    #[command(name = "benchmark")]
    Benchmark {
        /// Test data size
        #[arg(long, default_value = "64M")]
        size: String,
        /// Iterations to average over
        #[arg(long, default_value = "5")]
        iterations: u32,
    },
}

/// Manifest subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ManifestCommand {
    /// Hash a directory tree into a manifest
    #[command(name = "create")]
    Create {
        /// Directory to hash
        root: PathBuf,
        /// Manifest output path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Re-hash a tree and compare against a manifest
    #[command(name = "verify")]
    Verify {
        /// Manifest file
        manifest: PathBuf,
        /// Root to verify (defaults to the root recorded in the manifest)
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

/// Output format for digests
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `<base64>  <path>` lines
    #[default]
    Text,
    /// `<hex>  <path>` lines
    Hex,
    /// JSON array of results
    Json,
}

/// Runtime configuration derived from CLI args
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashConfig {
    /// Thread count (0 = auto-detect)
    pub threads: usize,
    /// Read buffer size in bytes
    pub buffer_size: usize,
    /// Output format
    pub format: OutputFormat,
    /// Follow symlinks
    pub follow_symlinks: bool,
    /// Include hidden files
    pub include_hidden: bool,
    /// Exclude patterns
    pub exclude_patterns: Vec<String>,
    /// Continue on error
    pub continue_on_error: bool,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            buffer_size: 1024 * 1024, // 1MB
            format: OutputFormat::Text,
            follow_symlinks: false,
            include_hidden: false,
            exclude_patterns: Vec::new(),
            continue_on_error: false,
        }
    }
}

impl HashConfig {
    /// Create config from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self, String> {
        let buffer_size = parse_size(&args.buffer_size)
            .map_err(|e| format!("Invalid buffer size: {}", e))?;

        if buffer_size == 0 {
            return Err("Invalid buffer size: must be greater than zero".to_string());
        }

        Ok(Self {
            threads: args.threads,
            buffer_size: buffer_size as usize,
            format: args.format,
            follow_symlinks: args.follow_symlinks,
            include_hidden: args.include_hidden,
            exclude_patterns: args.exclude.clone(),
            continue_on_error: args.continue_on_error,
        })
    }

    /// Effective worker count
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}

/// Parse human-readable size string to bytes
pub fn parse_size(size: &str) -> Result<u64, String> {
    let size = size.trim().to_uppercase();

    if size.is_empty() {
        return Err("Empty size string".to_string());
    }

    let (num_str, multiplier) = if size.ends_with("TB") || size.ends_with('T') {
        (size.trim_end_matches(['T', 'B']), 1024u64 * 1024 * 1024 * 1024)
    } else if size.ends_with("GB") || size.ends_with('G') {
        (size.trim_end_matches(['G', 'B']), 1024u64 * 1024 * 1024)
    } else if size.ends_with("MB") || size.ends_with('M') {
        (size.trim_end_matches(['M', 'B']), 1024u64 * 1024)
    } else if size.ends_with("KB") || size.ends_with('K') {
        (size.trim_end_matches(['K', 'B']), 1024u64)
    } else if size.ends_with('B') {
        (size.trim_end_matches('B'), 1u64)
    } else {
        // Assume bytes if no suffix
        (size.as_str(), 1u64)
    };

    let num: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: {}", num_str))?;

    if num < 0.0 {
        return Err(format!("Negative size: {}", num_str));
    }

    Ok((num * multiplier as f64) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert_eq!(parse_size("1K").unwrap(), 1024);
        assert_eq!(parse_size("1KB").unwrap(), 1024);
        assert_eq!(parse_size("64k").unwrap(), 64 * 1024);
        assert_eq!(parse_size("1M").unwrap(), 1024 * 1024);
        assert_eq!(parse_size("1G").unwrap(), 1024 * 1024 * 1024);
        assert_eq!(parse_size("1.5G").unwrap(), (1.5 * 1024.0 * 1024.0 * 1024.0) as u64);
        assert!(parse_size("").is_err());
        assert!(parse_size("lots").is_err());
        assert!(parse_size("-1M").is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let args = CliArgs::parse_from(["qxorsum", "a.bin", "b.bin"]);
        let config = HashConfig::from_cli(&args).unwrap();

        assert_eq!(args.paths.len(), 2);
        assert_eq!(config.buffer_size, 1024 * 1024);
        assert_eq!(config.format, OutputFormat::Text);
        assert!(config.effective_threads() >= 1);
    }

    #[test]
    fn test_cli_options_and_subcommands() {
        let args = CliArgs::parse_from([
            "qxorsum", "-t", "4", "-b", "64K", "--format", "json", "--exclude", "*.tmp", "dir",
        ]);
        let config = HashConfig::from_cli(&args).unwrap();
        assert_eq!(config.effective_threads(), 4);
        assert_eq!(config.buffer_size, 64 * 1024);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.exclude_patterns, vec!["*.tmp".to_string()]);

        let args = CliArgs::parse_from(["qxorsum", "manifest", "create", "/data", "-o", "m.json"]);
        assert!(matches!(
            args.command,
            Some(Commands::Manifest(ManifestCommand::Create { .. }))
        ));

        let args = CliArgs::parse_from(["qxorsum", "-b", "0", "x"]);
        assert!(HashConfig::from_cli(&args).is_err());
    }
}
