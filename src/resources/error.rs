//! Typed error variants for materialization.
//!
//! This module provides [`MaterializeError`], the runtime tier of failures:
//! everything that can go wrong after an entry was resolved.  None of these
//! leave a partial file at the target path; the caller decides whether the
//! run continues.

use std::path::PathBuf;
use thiserror::Error;

use crate::fetch::FetchError;

/// Errors that arise while writing a resolved entry to disk.
#[derive(Error, Debug)]
pub enum MaterializeError {
    /// An ancestor directory of the target could not be created.
    #[error("creating parent directories of {}: {source}", .path.display())]
    CreateDir {
        /// Target path whose parents were being created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The staging file could not be created or written.
    #[error("staging {}: {source}", .path.display())]
    Stage {
        /// Target path being staged.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The transport failed, including digest mismatches.
    #[error("fetching {}: {source}", .path.display())]
    Fetch {
        /// Target path being fetched.
        path: PathBuf,
        /// Transport error.
        source: FetchError,
    },

    /// Ownership could not be applied.
    #[error("changing owner of {} to {uid}:{gid}: {source}", .path.display())]
    Ownership {
        /// Path whose owner was being changed.
        path: PathBuf,
        /// Requested uid.
        uid: u32,
        /// Requested gid.
        gid: u32,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The permission mode could not be applied.
    #[error("setting mode {mode:o} on {}: {source}", .path.display())]
    Permissions {
        /// Path whose mode was being set.
        path: PathBuf,
        /// Requested mode.
        mode: u32,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The staging file could not be renamed onto the target.
    #[error("renaming staged file onto {}: {source}", .path.display())]
    Rename {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Creating a hard or symbolic link failed.
    #[error("creating link {}: {source}", .path.display())]
    Link {
        /// Link path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl MaterializeError {
    /// Target path the failure relates to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::CreateDir { path, .. }
            | Self::Stage { path, .. }
            | Self::Fetch { path, .. }
            | Self::Ownership { path, .. }
            | Self::Permissions { path, .. }
            | Self::Rename { path, .. }
            | Self::Link { path, .. } => path,
        }
    }
}
