//! qxorsum CLI - QuickXorHash content fingerprints
//!
//! Hashes files and trees, checks expected digests and maintains manifests.

use clap::Parser;
use quickxorhash::config::{CliArgs, Commands, HashConfig, ManifestCommand, OutputFormat};
use quickxorhash::core::{BatchHasher, BatchResult};
use quickxorhash::error::{QuickXorError, Result};
use quickxorhash::fs::{ScanConfig, Scanner};
use quickxorhash::hash::{benchmark, check_file, verify_files_match, HashManifest, QuickXorDigest};
use quickxorhash::progress::ProgressReporter;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() {
    let args = CliArgs::parse();

    init_logging(&args);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(args: &CliArgs) {
    let default_level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(args: CliArgs) -> Result<()> {
    if let Some(command) = &args.command {
        return handle_command(command, &args);
    }

    if args.paths.is_empty() {
        eprintln!("Usage: qxorsum <PATHS>... [OPTIONS]");
        eprintln!("       qxorsum --help for more information");
        eprintln!("       qxorsum check <PATH> <DIGEST>  - Check a file against a digest");
        eprintln!("       qxorsum manifest create <ROOT> -o <FILE>");
        std::process::exit(1);
    }

    let config = HashConfig::from_cli(&args).map_err(QuickXorError::ConfigError)?;

    let progress = if args.progress && !args.quiet {
        ProgressReporter::new()
    } else {
        ProgressReporter::disabled()
    };

    let result = BatchHasher::new(config.clone())
        .with_progress(progress)
        .execute(&args.paths)?;

    print_results(&result, config.format)?;

    if args.verbose > 0 && !args.quiet {
        result.print_summary();
    }

    if !result.is_success() {
        std::process::exit(1);
    }

    Ok(())
}

fn print_results(result: &BatchResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for entry in &result.entries {
                println!("{}  {}", entry.result.hash, entry.path.display());
            }
        }
        OutputFormat::Hex => {
            for entry in &result.entries {
                println!("{}  {}", entry.result.hash.to_hex(), entry.path.display());
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result.entries)?);
        }
    }

    Ok(())
}

fn handle_command(command: &Commands, args: &CliArgs) -> Result<()> {
    match command {
        Commands::Check { path, expected } => cmd_check(path, expected, args.quiet),
        Commands::Verify { source, destination } => cmd_verify(source, destination, args.quiet),
        Commands::Manifest(ManifestCommand::Create { root, output }) => {
            cmd_manifest_create(root, output, args)
        }
        Commands::Manifest(ManifestCommand::Verify { manifest, root }) => {
            cmd_manifest_verify(manifest, root.as_deref(), args.quiet)
        }
        Commands::Benchmark { size, iterations } => cmd_benchmark(size, *iterations),
    }
}

fn cmd_check(path: &Path, expected: &str, quiet: bool) -> Result<()> {
    let expected = QuickXorDigest::from_base64(expected)?;

    match check_file(path, &expected) {
        Ok(result) => {
            if !quiet {
                println!("{}: OK ({})", path.display(), result.hash);
            }
            Ok(())
        }
        Err(QuickXorError::IntegrityMismatch { actual, .. }) => {
            if !quiet {
                println!("{}: FAILED (got {})", path.display(), actual);
            }
            std::process::exit(1);
        }
        Err(e) => Err(e),
    }
}

fn cmd_verify(source: &Path, destination: &Path, quiet: bool) -> Result<()> {
    let result = verify_files_match(source, destination)?;

    if !quiet {
        println!("Source hash:      {}", result.source_hash);
        println!("Destination hash: {}", result.dest_hash);
        println!("Match: {}", if result.matches { "YES ✓" } else { "NO ✗" });
    }

    if !result.matches {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_manifest_create(root: &Path, output: &Path, args: &CliArgs) -> Result<()> {
    if !root.is_dir() {
        return Err(QuickXorError::config(format!(
            "Manifest root must be a directory: {}",
            root.display()
        )));
    }

    let config = HashConfig::from_cli(args).map_err(QuickXorError::ConfigError)?;
    let scanner = Scanner::new(ScanConfig {
        follow_symlinks: config.follow_symlinks,
        include_hidden: config.include_hidden,
        exclude_patterns: config.exclude_patterns.clone(),
    })?;
    let scan = scanner.scan(root)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.effective_threads())
        .build()
        .map_err(|e| QuickXorError::ThreadPoolError(e.to_string()))?;
    let manifest = pool.install(|| HashManifest::from_scan(&scan))?;

    manifest.save(output)?;

    if !args.quiet {
        println!(
            "Wrote {} entries ({}) to {}",
            manifest.entries.len(),
            humansize::format_size(manifest.total_size(), humansize::BINARY),
            output.display()
        );
    }

    Ok(())
}

fn cmd_manifest_verify(manifest_path: &Path, root: Option<&Path>, quiet: bool) -> Result<()> {
    let manifest = HashManifest::load(manifest_path)?;
    let root = root
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&manifest.root));

    let report = manifest.verify(&root);

    if !quiet {
        println!("Verifying {} against {}", manifest_path.display(), root.display());
        report.print_summary();
    }

    if !report.is_success() {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_benchmark(size: &str, iterations: u32) -> Result<()> {
    let size_bytes = quickxorhash::config::parse_size(size).map_err(QuickXorError::ConfigError)?;

    println!("=== QuickXorHash Benchmark ===");
    println!("Data size:  {}", humansize::format_size(size_bytes, humansize::BINARY));
    println!("Iterations: {}", iterations);

    let (duration, throughput) = benchmark(size_bytes as usize, iterations);

    println!("Duration:   {:.2?} per pass", duration);
    println!("Throughput: {:.1} MB/s", throughput);

    Ok(())
}
