//! Progress reporting while the source tree is read

use std::io::Write;
use tracing::info;

/// Observer notified once per fetched page of children
pub trait ProgressReporter: Send + Sync {
    fn page_fetched(&self, parent_id: &str, depth: usize, blocks: usize);
}

/// Reports nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn page_fetched(&self, _parent_id: &str, _depth: usize, _blocks: usize) {}
}

/// Prints a dot per fetched page for someone watching a terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct DotProgress;

impl ProgressReporter for DotProgress {
    fn page_fetched(&self, _parent_id: &str, _depth: usize, _blocks: usize) {
        let mut stdout = std::io::stdout();
        // Progress output is best effort
        let _ = write!(stdout, ".");
        let _ = stdout.flush();
    }
}

/// Logs each fetched page at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn page_fetched(&self, parent_id: &str, depth: usize, blocks: usize) {
        info!(parent_id, depth, blocks, "Fetched children");
    }
}
