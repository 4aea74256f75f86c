//! Resolution of manifest entries into executable plans.
//!
//! Resolution is pure: it borrows the entry, consults the identity database,
//! and returns a self-contained plan.  Every failure here is a
//! [`ResolveError`], which the command layer treats as fatal.
use std::path::PathBuf;
use url::Url;

use super::identity::{Identity, IdentityDb, resolve_identity};
use super::verification::{Verification, resolve_verification};
use crate::config::files::FileEntry;
use crate::config::links::LinkEntry;
use crate::error::ResolveError;
use crate::fetch::Compression;

/// A resolved file materialization, consumed once by
/// [`execute_fetch`](super::file::execute_fetch).
#[derive(Debug)]
pub struct FetchPlan {
    /// Target path as written in the manifest (joined under the root later).
    pub path: PathBuf,
    /// Permission bits to apply.
    pub mode: u32,
    /// Owner to apply.
    pub owner: Identity,
    /// Where the bytes come from; `None` produces an empty file.
    pub source: Option<Url>,
    /// Whether and how the bytes are checked.
    pub verification: Verification,
    /// Compression of the source bytes.
    pub compression: Compression,
}

/// Resolve a file entry into a [`FetchPlan`].
///
/// # Errors
///
/// Returns [`ResolveError`] if the source is not a URL, the verification or
/// compression spec is unusable, or an owner cannot be resolved.
pub fn resolve_fetch(entry: &FileEntry, db: &dyn IdentityDb) -> Result<FetchPlan, ResolveError> {
    let source = match entry.contents.source.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(Url::parse(raw).map_err(|error| ResolveError::InvalidSource {
            url: raw.to_string(),
            error,
        })?),
    };
    let verification = resolve_verification(entry.contents.verification.as_ref())?;
    let compression = resolve_compression(entry.contents.compression.as_deref())?;
    let owner = resolve_identity(&entry.user, &entry.group, db)?;

    Ok(FetchPlan {
        path: PathBuf::from(&entry.path),
        mode: entry.mode,
        owner,
        source,
        verification,
        compression,
    })
}

/// Map a compression hint onto [`Compression`].
///
/// # Errors
///
/// Returns [`ResolveError::UnsupportedCompression`] for anything other than
/// an absent or empty hint or `"gzip"`.
pub fn resolve_compression(hint: Option<&str>) -> Result<Compression, ResolveError> {
    match hint {
        None | Some("") => Ok(Compression::None),
        Some("gzip") => Ok(Compression::Gzip),
        Some(other) => Err(ResolveError::UnsupportedCompression(other.to_string())),
    }
}

/// How a link is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind {
    /// Hard link; shares the target inode and its owner.
    Hard,
    /// Symbolic link owned by `owner`.
    Symbolic {
        /// Owner applied to the link entry itself.
        owner: Identity,
    },
}

/// A resolved link, consumed once by [`write_link`](super::link::write_link).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPlan {
    /// Link path as written in the manifest.
    pub path: PathBuf,
    /// Link target.  Stored literally for symbolic links; joined under the
    /// root for hard links.
    pub target: PathBuf,
    /// Hard or symbolic.
    pub kind: LinkKind,
}

/// Resolve a link entry into a [`LinkPlan`].
///
/// Hard links resolve no owner.
///
/// # Errors
///
/// Returns [`ResolveError`] if a symbolic link's owner cannot be resolved.
pub fn resolve_link(entry: &LinkEntry, db: &dyn IdentityDb) -> Result<LinkPlan, ResolveError> {
    let kind = if entry.hard {
        LinkKind::Hard
    } else {
        LinkKind::Symbolic {
            owner: resolve_identity(&entry.user, &entry.group, db)?,
        }
    };
    Ok(LinkPlan {
        path: PathBuf::from(&entry.path),
        target: PathBuf::from(&entry.target),
        kind,
    })
}
