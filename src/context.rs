//! Shared context for materializing manifest entries.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::fetch::{Fetcher, UrlFetcher};
use crate::logging::Log;
use crate::operations::{FileSystemOps, SystemFileSystemOps};
use crate::resources::helpers::fs::join_root;
use crate::resources::identity::{IdentityDb, PasswdDb};

/// Collaborators and settings shared by every entry of a run.
pub struct Context {
    /// Destination root every manifest path is joined under.
    pub root: PathBuf,
    /// Resolve entries but do not write anything.
    pub dry_run: bool,
    /// Logger for output and entry recording.
    pub log: Arc<dyn Log>,
    /// Transport for file contents.
    pub fetcher: Arc<dyn Fetcher>,
    /// User and group database.
    pub identity_db: Arc<dyn IdentityDb>,
    /// Ownership operations (injectable for testing).
    pub fs_ops: Arc<dyn FileSystemOps>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("root", &self.root)
            .field("dry_run", &self.dry_run)
            .field("log", &"<dyn Log>")
            .field("fetcher", &"<dyn Fetcher>")
            .field("identity_db", &"<dyn IdentityDb>")
            .field("fs_ops", &self.fs_ops)
            .finish()
    }
}

impl Context {
    /// Create a context for `root` with the production collaborators:
    /// [`UrlFetcher`], a [`PasswdDb`] reading the root's own identity files,
    /// and [`SystemFileSystemOps`].
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, log: Arc<dyn Log>, dry_run: bool) -> Self {
        let root = root.into();
        Self {
            identity_db: Arc::new(PasswdDb::new(&root)),
            root,
            dry_run,
            log,
            fetcher: Arc::new(UrlFetcher::new()),
            fs_ops: Arc::new(SystemFileSystemOps),
        }
    }

    /// Replace the transport.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Replace the identity database.
    #[must_use]
    pub fn with_identity_db(mut self, db: Arc<dyn IdentityDb>) -> Self {
        self.identity_db = db;
        self
    }

    /// Replace the ownership operations.
    #[must_use]
    pub fn with_fs_ops(mut self, fs_ops: Arc<dyn FileSystemOps>) -> Self {
        self.fs_ops = fs_ops;
        self
    }

    /// Location of a manifest path under the destination root.
    #[must_use]
    pub fn target(&self, path: &Path) -> PathBuf {
        join_root(&self.root, path)
    }
}
