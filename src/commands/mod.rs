//! Top-level subcommand orchestration.
pub mod apply;
pub mod check;
pub mod version;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::context::Context;
use crate::error::{BootfilesError, ConfigError, Disposition, FailurePolicy, Severity};
use crate::logging::{EntryStatus, Log, Logger};
use crate::resources::file::FileResource;
use crate::resources::identity::has_identity_files;
use crate::resources::link::LinkResource;
use crate::resources::{Applicable, ResourceChange};

/// Shared state produced by the common command setup sequence.
///
/// Loads and validates the manifest and builds the materialization context,
/// so that each command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// The validated manifest.
    pub config: Config,
    /// Context every entry is applied with.
    pub ctx: Context,
}

impl CommandSetup {
    /// Load the manifest at `manifest`, validate it, and build a context.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read or parsed, or if
    /// validation reports any warning.
    pub fn init(global: &GlobalOpts, manifest: &Path, log: &Arc<Logger>) -> Result<Self> {
        log.stage("Loading manifest");
        let config = Config::load(manifest)
            .with_context(|| format!("loading manifest {}", manifest.display()))?;
        log.info(&format!(
            "loaded {} files, {} links",
            config.files.len(),
            config.links.len()
        ));

        let warnings = config.validate();
        if !warnings.is_empty() {
            log.warn(&format!(
                "found {} configuration warning(s):",
                warnings.len()
            ));
            for warning in &warnings {
                log.warn(&format!(
                    "  {} [{}]: {}",
                    warning.source, warning.item, warning.message
                ));
            }
            return Err(BootfilesError::from(ConfigError::Invalid {
                count: warnings.len(),
            })
            .into());
        }

        log.debug(&format!("destination root: {}", global.root.display()));
        if !has_identity_files(&global.root) {
            log.debug("no etc/passwd and etc/group under root; only numeric owners will resolve");
        }

        let ctx = Context::new(
            global.root.clone(),
            Arc::clone(log) as Arc<dyn Log>,
            global.dry_run,
        );
        Ok(Self { config, ctx })
    }

    /// Every entry of the manifest in processing order: files first, then
    /// links, each in declaration order.
    #[must_use]
    pub fn entries(&self) -> Vec<Box<dyn Applicable>> {
        let files = self
            .config
            .files
            .iter()
            .map(|entry| Box::new(FileResource::new(entry.clone())) as Box<dyn Applicable>);
        let links = self
            .config
            .links
            .iter()
            .map(|entry| Box::new(LinkResource::new(entry.clone())) as Box<dyn Applicable>);
        files.chain(links).collect()
    }
}

/// Apply one entry, record the outcome, and decide whether the run goes on.
#[must_use]
pub fn execute(entry: &dyn Applicable, ctx: &Context, policy: FailurePolicy) -> Disposition {
    let name = entry.description();
    ctx.log.debug(&format!("applying {name}"));

    match entry.apply(ctx) {
        Ok(ResourceChange::Applied) => {
            ctx.log.record_entry(&name, EntryStatus::Ok, None);
            Disposition::Continue
        }
        Ok(ResourceChange::DryRun) => {
            ctx.log.record_entry(&name, EntryStatus::DryRun, None);
            Disposition::Continue
        }
        Err(e) => report_failure(&name, e, ctx.log.as_ref(), policy),
    }
}

/// Log a failed entry through the channel its severity calls for and return
/// what the policy says to do next.
fn report_failure(
    name: &str,
    err: BootfilesError,
    log: &dyn Log,
    policy: FailurePolicy,
) -> Disposition {
    let severity = err.severity();
    if let BootfilesError::Materialize(e) = &err {
        log.debug(&format!("{name}: {} left as it was", e.path().display()));
    }
    let message = format!("{:#}", anyhow::Error::new(err));
    match severity {
        Severity::Fatal => log.fatal(&format!("{name}: {message}")),
        Severity::Recoverable => log.error(&format!("{name}: {message}")),
    }
    log.record_entry(name, EntryStatus::Failed, Some(&message));
    policy.disposition(severity)
}

/// Execute every entry in order, print the summary, and bail if any entry
/// failed.
///
/// When the policy aborts, every entry after the failing one is recorded as
/// not run.
///
/// # Errors
///
/// Returns an error if one or more entries recorded a failure.
pub fn run_entries_to_completion(
    entries: &[Box<dyn Applicable>],
    ctx: &Context,
    policy: FailurePolicy,
    log: &Logger,
) -> Result<()> {
    let mut remaining = entries.iter();
    for entry in remaining.by_ref() {
        if execute(entry.as_ref(), ctx, policy) == Disposition::Abort {
            break;
        }
    }
    for entry in remaining {
        log.record_entry(&entry.description(), EntryStatus::NotRun, None);
    }

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} entry(s) failed");
    }
    Ok(())
}
