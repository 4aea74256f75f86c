//! File materialization with atomic replace.
//!
//! Content is streamed into a staging file created next to the target,
//! owner and mode are applied to that staging file, and a single rename
//! makes the result visible.  The target path therefore only ever shows
//! its previous state or the complete, verified, correctly owned new file.
use std::fs::{File, Permissions};
use std::io::{self, Write as _};
use std::os::unix::fs::PermissionsExt as _;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::error::MaterializeError;
use super::fetch_plan::{FetchPlan, resolve_fetch};
use super::helpers::fs::ensure_parent_dir;
use super::{Applicable, ResourceChange};
use crate::config::files::FileEntry;
use crate::context::Context;
use crate::error::BootfilesError;
use crate::fetch::{FetchOptions, TeeWriter};

/// Name prefix of staging files.
pub const STAGING_PREFIX: &str = ".bootfiles-";

/// A staging file in the same directory as its eventual target.
///
/// [`commit`](Self::commit) renames it onto the target.  Dropping it
/// without committing removes it; removal errors are ignored.
#[derive(Debug)]
pub struct StagingFile {
    file: NamedTempFile,
    target: PathBuf,
}

impl StagingFile {
    /// Create a staging file in the parent directory of `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create_for(target: &Path) -> io::Result<Self> {
        let dir = target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempfile_in(dir)?;
        Ok(Self {
            file,
            target: target.to_path_buf(),
        })
    }

    /// Current path of the staging file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// The open staging file.
    #[must_use]
    pub fn as_file(&self) -> &File {
        self.file.as_file()
    }

    /// The open staging file, for writing.
    pub fn as_file_mut(&mut self) -> &mut File {
        self.file.as_file_mut()
    }

    /// Atomically rename the staging file onto its target.
    ///
    /// # Errors
    ///
    /// Returns an error if the rename fails; the staging file is removed.
    pub fn commit(self) -> io::Result<()> {
        self.file
            .persist(&self.target)
            .map(drop)
            .map_err(|e| e.error)
    }
}

/// Materialize a resolved file.
///
/// Creates missing ancestors, stages the transport's output next to the
/// target, fixes owner then mode on the staging file, and renames it into
/// place.  On any error the staging file is removed and the target is left
/// as it was.
///
/// # Errors
///
/// Returns [`MaterializeError`] describing the step that failed.
pub fn execute_fetch(plan: FetchPlan, ctx: &Context) -> Result<(), MaterializeError> {
    let FetchPlan {
        path,
        mode,
        owner,
        source,
        mut verification,
        compression,
    } = plan;
    let target = ctx.target(&path);

    ensure_parent_dir(&target).map_err(|source| MaterializeError::CreateDir {
        path: target.clone(),
        source,
    })?;

    let mut staging = StagingFile::create_for(&target).map_err(|source| MaterializeError::Stage {
        path: target.clone(),
        source,
    })?;
    tracing::debug!(
        "staging {} at {}",
        target.display(),
        staging.path().display()
    );
    if verification.is_verified() {
        tracing::debug!(
            "expecting digest {} for {}",
            hex::encode(verification.expected()),
            target.display()
        );
    }

    {
        let (hasher, expected_sum) = verification.parts_mut();
        let opts = FetchOptions {
            compression,
            expected_sum,
        };
        let mut dest = TeeWriter::new(staging.as_file_mut(), hasher);
        ctx.fetcher
            .fetch(source.as_ref(), &mut dest, &opts)
            .map_err(|source| MaterializeError::Fetch {
                path: target.clone(),
                source,
            })?;
        tracing::debug!("fetched {} bytes for {}", dest.written(), target.display());
    }

    let stage_err = |source| MaterializeError::Stage {
        path: target.clone(),
        source,
    };
    staging.as_file_mut().flush().map_err(stage_err)?;
    staging.as_file().sync_all().map_err(stage_err)?;

    // chown may clear set-id bits, so the mode goes on afterwards.
    ctx.fs_ops
        .fchown(staging.as_file(), owner)
        .map_err(|source| MaterializeError::Ownership {
            path: target.clone(),
            uid: owner.uid,
            gid: owner.gid,
            source,
        })?;
    staging
        .as_file()
        .set_permissions(Permissions::from_mode(mode))
        .map_err(|source| MaterializeError::Permissions {
            path: target.clone(),
            mode,
            source,
        })?;

    staging.commit().map_err(|source| MaterializeError::Rename {
        path: target,
        source,
    })
}

/// A file entry from the manifest.
#[derive(Debug, Clone)]
pub struct FileResource {
    entry: FileEntry,
}

impl FileResource {
    /// Wrap a manifest entry.
    #[must_use]
    pub const fn new(entry: FileEntry) -> Self {
        Self { entry }
    }
}

impl Applicable for FileResource {
    fn description(&self) -> String {
        format!("file {}", self.entry.path)
    }

    fn check(&self, ctx: &Context) -> Result<(), BootfilesError> {
        resolve_fetch(&self.entry, ctx.identity_db.as_ref())?;
        Ok(())
    }

    fn apply(&self, ctx: &Context) -> Result<ResourceChange, BootfilesError> {
        let plan = resolve_fetch(&self.entry, ctx.identity_db.as_ref())?;
        if ctx.dry_run {
            ctx.log.dry_run(&format!(
                "would write {} (mode {:o}, owner {})",
                ctx.target(&plan.path).display(),
                plan.mode,
                plan.owner
            ));
            return Ok(ResourceChange::DryRun);
        }
        execute_fetch(plan, ctx)?;
        Ok(ResourceChange::Applied)
    }
}
