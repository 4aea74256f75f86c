//! Materialization primitives: resolve an entry, then write it.
pub mod error;
pub mod fetch_plan;
pub mod file;
pub mod helpers;
pub mod identity;
pub mod link;
pub mod verification;

use crate::context::Context;
use crate::error::BootfilesError;

/// Minimal interface for manifest entries that can be resolved and applied.
///
/// Resolution never touches the destination; it either yields a plan or a
/// fatal [`ResolveError`](crate::error::ResolveError).  Applying resolves
/// first and then writes, so a resolution failure never leaves partial
/// state behind.
pub trait Applicable {
    /// Human-readable description of this entry.
    fn description(&self) -> String;

    /// Resolve the entry without writing anything.
    ///
    /// # Errors
    ///
    /// Returns a resolution error if the entry cannot be turned into a plan.
    fn check(&self, ctx: &Context) -> Result<(), BootfilesError>;

    /// Resolve the entry and, unless the context is a dry run, write it.
    ///
    /// # Errors
    ///
    /// Returns a resolution error (fatal) or a materialization error
    /// (recoverable).
    fn apply(&self, ctx: &Context) -> Result<ResourceChange, BootfilesError>;
}

/// Result of applying an entry.
///
/// # Examples
///
/// ```
/// use bootfiles_cli::resources::ResourceChange;
///
/// assert_ne!(ResourceChange::Applied, ResourceChange::DryRun);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceChange {
    /// The entry was written.
    Applied,
    /// The entry resolved, but nothing was written because of `--dry-run`.
    DryRun,
}
