//! Command: resolve every entry without touching the destination.
use std::sync::Arc;

use anyhow::Result;

use super::CommandSetup;
use crate::cli::{CheckOpts, GlobalOpts};
use crate::logging::{EntryStatus, Log, Logger};

/// Run the check command.
///
/// Every entry is resolved against the destination root's identity
/// database; nothing is fetched or written.  All entries are checked even
/// after a failure so that one run reports every problem.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or validated, or if
/// any entry fails to resolve.
pub fn run(global: &GlobalOpts, opts: &CheckOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, &opts.config, log)?;

    log.stage("Resolving entries");
    for entry in setup.entries() {
        let name = entry.description();
        match entry.check(&setup.ctx) {
            Ok(()) => log.record_entry(&name, EntryStatus::Ok, None),
            Err(e) => {
                let message = format!("{:#}", anyhow::Error::new(e));
                log.error(&format!("{name}: {message}"));
                log.record_entry(&name, EntryStatus::Failed, Some(&message));
            }
        }
    }

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} entry(s) failed to resolve");
    }
    Ok(())
}
