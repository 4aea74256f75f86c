//! Ownership operation abstractions for dependency injection.
//!
//! Provides the [`FileSystemOps`] trait so that materialization can be
//! unit-tested without superuser privileges.  Production code uses
//! [`SystemFileSystemOps`]; tests use `MockFileSystemOps`, which records
//! every call instead of changing ownership.

use std::fs::File;
use std::path::Path;

use crate::resources::identity::Identity;

/// Ownership changes performed during materialization.
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Change the owner of an open file.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner cannot be changed.
    fn fchown(&self, file: &File, owner: Identity) -> std::io::Result<()>;

    /// Change the owner of `path` itself, without following a symlink.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner cannot be changed.
    fn lchown(&self, path: &Path, owner: Identity) -> std::io::Result<()>;
}

/// Production [`FileSystemOps`] implementation that delegates to
/// [`std::os::unix::fs`].
#[derive(Debug, Default)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn fchown(&self, file: &File, owner: Identity) -> std::io::Result<()> {
        std::os::unix::fs::fchown(file, Some(owner.uid), Some(owner.gid))
    }

    fn lchown(&self, path: &Path, owner: Identity) -> std::io::Result<()> {
        std::os::unix::fs::lchown(path, Some(owner.uid), Some(owner.gid))
    }
}

/// A call recorded by `MockFileSystemOps`.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnershipCall {
    /// `fchown` on an open file.
    Fchown(Identity),
    /// `lchown` on a path.
    Lchown(std::path::PathBuf, Identity),
}

/// Mock [`FileSystemOps`] for unit tests.
///
/// Records calls and succeeds, or fails every call when built with
/// [`MockFileSystemOps::failing`].
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFileSystemOps {
    calls: std::sync::Mutex<Vec<OwnershipCall>>,
    fail: bool,
}

#[cfg(test)]
impl MockFileSystemOps {
    /// Create a mock that accepts every call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose calls fail with `PermissionDenied`.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Calls recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<OwnershipCall> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: OwnershipCall) -> std::io::Result<()> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(call);
        if self.fail {
            Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
impl FileSystemOps for MockFileSystemOps {
    fn fchown(&self, _file: &File, owner: Identity) -> std::io::Result<()> {
        self.record(OwnershipCall::Fchown(owner))
    }

    fn lchown(&self, path: &Path, owner: Identity) -> std::io::Result<()> {
        self.record(OwnershipCall::Lchown(path.to_path_buf(), owner))
    }
}
