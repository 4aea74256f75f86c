// Shared helpers for integration tests.
//
// Provides a temporary destination root with its own identity database and a
// fluent builder so each integration test can set up an isolated sysroot
// without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::os::unix::fs::MetadataExt as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bootfiles_cli::cli::GlobalOpts;
use bootfiles_cli::context::Context;
use bootfiles_cli::logging::{Log, Logger};
use bootfiles_cli::resources::identity::Identity;

/// Name given to the invoking user in the sysroot's `etc/passwd`.
pub const CORE_USER: &str = "core";

/// An isolated destination root backed by a [`tempfile::TempDir`].
///
/// Layout:
/// - `sysroot/`        destination root, with `etc/passwd` and `etc/group`
///   mapping [`CORE_USER`] to the invoking user's ids
/// - `sources/`        files served through `file://` URLs
/// - `manifest.toml`   written by [`IntegrationTestContext::with_manifest`]
/// - `bootfiles.log`   run log
pub struct IntegrationTestContext {
    /// Temporary directory holding everything above.
    pub dir: tempfile::TempDir,
    /// Ids of the invoking user, so ownership changes succeed unprivileged.
    pub me: Identity,
}

impl IntegrationTestContext {
    /// Create a context with an empty sysroot and identity files.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let meta = std::fs::metadata(dir.path()).expect("stat temp dir");
        let me = Identity::new(meta.uid(), meta.gid());

        let etc = dir.path().join("sysroot/etc");
        std::fs::create_dir_all(&etc).expect("create sysroot etc");
        std::fs::create_dir_all(dir.path().join("sources")).expect("create sources dir");
        std::fs::write(
            etc.join("passwd"),
            format!(
                "root:x:0:0:root:/root:/bin/sh\n{CORE_USER}:x:{}:{}::/home/{CORE_USER}:/bin/sh\n",
                me.uid, me.gid
            ),
        )
        .expect("write passwd");
        std::fs::write(
            etc.join("group"),
            format!("root:x:0:\n{CORE_USER}:x:{}:\n", me.gid),
        )
        .expect("write group");

        Self { dir, me }
    }

    /// Write the manifest, returning `self` for chaining.
    #[must_use]
    pub fn with_manifest(self, body: &str) -> Self {
        std::fs::write(self.manifest_path(), body).expect("write manifest");
        self
    }

    /// Place a source file under `sources/`, returning its `file://` URL.
    pub fn source(&self, name: &str, contents: &[u8]) -> String {
        let path = self.dir.path().join("sources").join(name);
        std::fs::write(&path, contents).expect("write source");
        url::Url::from_file_path(&path)
            .expect("absolute source path")
            .to_string()
    }

    /// Destination root.
    pub fn root(&self) -> PathBuf {
        self.dir.path().join("sysroot")
    }

    /// Location of a manifest path inside the destination root.
    pub fn target(&self, path: &str) -> PathBuf {
        self.root().join(path.trim_start_matches('/'))
    }

    /// Path of the manifest file.
    pub fn manifest_path(&self) -> PathBuf {
        self.dir.path().join("manifest.toml")
    }

    /// Global options pointing at this sysroot.
    pub fn global(&self, dry_run: bool) -> GlobalOpts {
        GlobalOpts {
            dry_run,
            root: self.root(),
            log_file: Some(self.log_path()),
        }
    }

    /// Logger writing to this context's log file.
    pub fn logger(&self) -> Arc<Logger> {
        Arc::new(Logger::new("test", Some(&self.log_path())))
    }

    /// Production context for this sysroot.
    pub fn context(&self, log: &Arc<Logger>) -> Context {
        Context::new(self.root(), Arc::clone(log) as Arc<dyn Log>, false)
    }

    fn log_path(&self) -> PathBuf {
        self.dir.path().join("bootfiles.log")
    }
}

/// Names of all entries in `dir`, sorted.
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Permission bits of `path`.
pub fn mode_of(path: &Path) -> u32 {
    std::fs::metadata(path).expect("stat").mode() & 0o7777
}

/// Owner of `path` itself, not following symlinks.
pub fn owner_of(path: &Path) -> Identity {
    let meta = std::fs::symlink_metadata(path).expect("lstat");
    Identity::new(meta.uid(), meta.gid())
}

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    use sha2::Digest as _;
    hex::encode(sha2::Sha256::digest(data))
}

/// Lowercase hex SHA-512 of `data`.
pub fn sha512_hex(data: &[u8]) -> String {
    use sha2::Digest as _;
    hex::encode(sha2::Sha512::digest(data))
}
