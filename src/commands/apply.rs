//! Command: materialize every entry of a manifest.
use std::sync::Arc;

use anyhow::Result;

use super::{CommandSetup, run_entries_to_completion};
use crate::cli::{ApplyOpts, GlobalOpts};
use crate::error::FailurePolicy;
use crate::logging::{Log, Logger};

/// Run the apply command.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or validated, or if
/// any entry fails.
pub fn run(global: &GlobalOpts, opts: &ApplyOpts, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("bootfiles {}", super::version::version()));

    let setup = CommandSetup::init(global, &opts.config, log)?;
    let policy = FailurePolicy {
        keep_going: opts.keep_going,
    };

    log.stage("Materializing entries");
    if global.dry_run {
        log.dry_run("no changes will be written");
    }
    run_entries_to_completion(&setup.entries(), &setup.ctx, policy, log)
}
