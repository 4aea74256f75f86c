//! Structured logger with dry-run awareness and summary collection.
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, FATAL_TARGET, STAGE_TARGET};
use super::types::{EntryRecord, EntryStatus, Log};
use super::utils::log_file_path;

/// Structured logger with dry-run awareness and summary collection.
///
/// All messages are also written to a persistent log file (see
/// [`init_subscriber`](super::subscriber::init_subscriber)) with timestamps
/// and ANSI codes stripped, regardless of the verbose flag.
#[derive(Debug)]
pub struct Logger {
    entries: Mutex<Vec<EntryRecord>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger.
    ///
    /// Stores the log file path for display in the run summary.  The file
    /// itself is created by the subscriber's file layer.
    #[must_use]
    pub fn new(command: &str, log_file: Option<&Path>) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            log_file: log_file_path(command, log_file),
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded entries.
    #[must_use]
    pub fn entries(&self) -> Vec<EntryRecord> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Count the number of failed entries.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.entries.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|e| e.status == EntryStatus::Failed)
                .count()
        })
    }

    /// Print the summary of all recorded entries.
    pub fn print_summary(&self) {
        let entries = self.entries();
        if entries.is_empty() {
            return;
        }

        self.stage("Summary");

        let mut ok = 0u32;
        let mut dry_run = 0u32;
        let mut failed = 0u32;
        let mut not_run = 0u32;

        for entry in &entries {
            let (icon, color) = match entry.status {
                EntryStatus::Ok => {
                    ok += 1;
                    ("✓", "\x1b[32m")
                }
                EntryStatus::DryRun => {
                    dry_run += 1;
                    ("~", "\x1b[37m")
                }
                EntryStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
                EntryStatus::NotRun => {
                    not_run += 1;
                    ("·", "\x1b[2m")
                }
            };

            let suffix = entry
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", entry.name));
        }

        let total = ok + dry_run + failed + not_run;
        self.info(&format!(
            "{total} entries: \x1b[32m{ok} ok\x1b[0m, \x1b[37m{dry_run} dry-run\x1b[0m, \x1b[31m{failed} failed\x1b[0m, \x1b[2m{not_run} not run\x1b[0m"
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Suppressed on console unless verbose; always written to the log file.
    fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    fn fatal(&self, msg: &str) {
        tracing::error!(target: FATAL_TARGET, "{msg}");
    }

    fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    fn record_entry(&self, name: &str, status: EntryStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(EntryRecord {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }
}
