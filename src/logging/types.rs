//! Core logging types: entry records, status, and the [`Log`] trait.

/// Per-entry result for summary reporting.
#[derive(Debug, Clone)]
pub struct EntryRecord {
    /// Entry description, e.g. `file /etc/hostname`.
    pub name: String,
    /// Final status of the entry.
    pub status: EntryStatus,
    /// Optional detail message (e.g., error description).
    pub message: Option<String>,
}

/// Status of a processed manifest entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Entry was materialized.
    Ok,
    /// Entry was resolved but not written because of `--dry-run`.
    DryRun,
    /// Entry failed.
    Failed,
    /// Entry was never attempted because the run aborted first.
    NotRun,
}

/// Abstraction over logging backends.
///
/// Commands log through this trait so tests can substitute a recorder for
/// [`Logger`](super::logger::Logger).
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a failure that aborts the run.
    fn fatal(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record an entry result for the summary.
    fn record_entry(&self, name: &str, status: EntryStatus, message: Option<&str>);
}
