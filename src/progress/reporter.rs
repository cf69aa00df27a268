//! Terminal progress for batch hashing
//!
//! Three lines on stderr: the file most recently handed to a worker, a file
//! counter, and a byte bar with throughput and ETA.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::path::Path;

const FILES_TEMPLATE: &str = "{prefix:>5.bold.dim} [{bar:40.cyan/blue}] {pos}/{len} files";
const BYTES_TEMPLATE: &str =
    "{prefix:>5.bold.dim} [{bar:40.green/white}] {bytes}/{total_bytes} ({bytes_per_sec}, ETA {eta})";

/// Progress display for a batch of files
///
/// Workers on the rayon pool share one reporter; indicatif bars are
/// internally synchronized, so every method takes `&self`.
pub struct ProgressReporter {
    multi: MultiProgress,
    current: ProgressBar,
    files: ProgressBar,
    bytes: ProgressBar,
}

fn counter(multi: &MultiProgress, prefix: &'static str, template: &str) -> ProgressBar {
    let style = ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    multi.add(ProgressBar::new(0).with_style(style).with_prefix(prefix))
}

impl ProgressReporter {
    /// Reporter drawing to stderr
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Reporter that tracks counts but draws nothing (quiet mode, tests)
    pub fn disabled() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let multi = MultiProgress::with_draw_target(target);

        let spinner = ProgressStyle::with_template("{spinner:.cyan} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let current = multi.add(ProgressBar::new_spinner().with_style(spinner));

        let files = counter(&multi, "Files", FILES_TEMPLATE);
        let bytes = counter(&multi, "Data", BYTES_TEMPLATE);

        Self {
            multi,
            current,
            files,
            bytes,
        }
    }

    /// Show a status line while totals are still unknown
    pub fn set_status(&self, msg: &str) {
        self.current.set_message(msg.to_string());
    }

    /// Set the totals once the inputs have been scanned
    pub fn begin(&self, files: u64, bytes: u64) {
        self.files.set_length(files);
        self.bytes.set_length(bytes);
        self.current.set_message("Hashing...");
    }

    /// A worker picked up `path`
    pub fn start_file(&self, path: &Path) {
        self.current.set_message(path.display().to_string());
        self.current.tick();
    }

    /// A file is done; `bytes` is `None` when it could not be hashed
    pub fn finish_file(&self, bytes: Option<u64>) {
        self.files.inc(1);
        if let Some(bytes) = bytes {
            self.bytes.inc(bytes);
        }
    }

    /// Print a failure above the bars without tearing them
    pub fn report_failure(&self, path: &Path, error: &str) {
        // Hidden targets swallow the line
        let _ = self.multi.println(format!("✗ {}: {}", path.display(), error));
    }

    /// Files completed so far, hashed or failed
    pub fn files_done(&self) -> u64 {
        self.files.position()
    }

    /// Bytes folded into digests so far
    pub fn bytes_done(&self) -> u64 {
        self.bytes.position()
    }

    /// Leave the bars on screen with a final status line
    pub fn finish(&self, hashed: usize, failed: usize) {
        let message = if failed == 0 {
            format!("✓ Hashed {} files", hashed)
        } else {
            format!("✗ Hashed {} files, {} failed", hashed, failed)
        };
        self.current.finish_with_message(message);
        self.files.finish();
        self.bytes.finish();
    }

    /// Stop early after a fatal error
    pub fn abandon(&self, message: &str) {
        self.current.abandon_with_message(format!("✗ {}", message));
        self.files.abandon();
        self.bytes.abandon();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}
