//! Hard and symbolic link materialization.
use super::error::MaterializeError;
use super::fetch_plan::{LinkKind, LinkPlan, resolve_link};
use super::helpers::fs::ensure_parent_dir;
use super::{Applicable, ResourceChange};
use crate::config::links::LinkEntry;
use crate::context::Context;
use crate::error::BootfilesError;

/// Create a resolved link.
///
/// Hard links point at the target joined under the root and make no
/// ownership call, since they share the target's inode.  Symbolic links
/// store the target string literally, then the owner is applied to the
/// link entry itself.
///
/// # Errors
///
/// Returns [`MaterializeError`] if a directory, the link, or its owner
/// cannot be created or changed.
pub fn write_link(plan: &LinkPlan, ctx: &Context) -> Result<(), MaterializeError> {
    let path = ctx.target(&plan.path);
    ensure_parent_dir(&path).map_err(|source| MaterializeError::CreateDir {
        path: path.clone(),
        source,
    })?;

    let link_err = |source| MaterializeError::Link {
        path: path.clone(),
        source,
    };
    match &plan.kind {
        LinkKind::Hard => {
            std::fs::hard_link(ctx.target(&plan.target), &path).map_err(link_err)?;
        }
        LinkKind::Symbolic { owner } => {
            std::os::unix::fs::symlink(&plan.target, &path).map_err(link_err)?;
            ctx.fs_ops
                .lchown(&path, *owner)
                .map_err(|source| MaterializeError::Ownership {
                    path: path.clone(),
                    uid: owner.uid,
                    gid: owner.gid,
                    source,
                })?;
        }
    }
    Ok(())
}

/// A link entry from the manifest.
#[derive(Debug, Clone)]
pub struct LinkResource {
    entry: LinkEntry,
}

impl LinkResource {
    /// Wrap a manifest entry.
    #[must_use]
    pub const fn new(entry: LinkEntry) -> Self {
        Self { entry }
    }
}

impl Applicable for LinkResource {
    fn description(&self) -> String {
        let kind = if self.entry.hard { "hard link" } else { "link" };
        format!("{kind} {} -> {}", self.entry.path, self.entry.target)
    }

    fn check(&self, ctx: &Context) -> Result<(), BootfilesError> {
        resolve_link(&self.entry, ctx.identity_db.as_ref())?;
        Ok(())
    }

    fn apply(&self, ctx: &Context) -> Result<ResourceChange, BootfilesError> {
        let plan = resolve_link(&self.entry, ctx.identity_db.as_ref())?;
        if ctx.dry_run {
            ctx.log.dry_run(&format!(
                "would link {} -> {}",
                ctx.target(&plan.path).display(),
                plan.target.display()
            ));
            return Ok(ResourceChange::DryRun);
        }
        write_link(&plan, ctx)?;
        Ok(ResourceChange::Applied)
    }
}
