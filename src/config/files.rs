//! File entry configuration.
use serde::Deserialize;

use super::owner::OwnerSpec;

/// Mode applied to files whose entry does not set one.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// A file to materialize under the destination root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileEntry {
    /// Absolute target path, interpreted relative to the destination root.
    pub path: String,
    /// Permission bits (e.g. `0o644`).
    #[serde(default = "default_file_mode")]
    pub mode: u32,
    /// Owning user.
    #[serde(default)]
    pub user: OwnerSpec,
    /// Owning group.
    #[serde(default)]
    pub group: OwnerSpec,
    /// Where the bytes come from and how to check them.
    #[serde(default)]
    pub contents: FileContents,
}

const fn default_file_mode() -> u32 {
    DEFAULT_FILE_MODE
}

/// Contents section of a [`FileEntry`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileContents {
    /// Source URL (`http`, `https`, `data`, `file`).  Absent means an empty file.
    #[serde(default)]
    pub source: Option<String>,
    /// Optional content verification.
    #[serde(default)]
    pub verification: Option<VerificationSpec>,
    /// Compression applied to the source bytes (`"gzip"`), if any.
    #[serde(default)]
    pub compression: Option<String>,
}

/// Verification section of [`FileContents`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerificationSpec {
    /// Expected digest in the form `<algorithm>-<hex digest>`.
    #[serde(default)]
    pub hash: Option<String>,
}

impl VerificationSpec {
    /// Split the hash string into `(algorithm, hex digest)`.
    ///
    /// Returns `None` when no hash is set or the string has no `-` separator.
    #[must_use]
    pub fn hash_parts(&self) -> Option<(&str, &str)> {
        self.hash.as_deref()?.split_once('-')
    }
}

impl FileEntry {
    /// Create an entry with default mode, root ownership, and no source.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: DEFAULT_FILE_MODE,
            user: OwnerSpec::default(),
            group: OwnerSpec::default(),
            contents: FileContents::default(),
        }
    }

    /// Set the source URL.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.contents.source = Some(source.into());
        self
    }

    /// Set the expected `<algorithm>-<hex>` hash.
    #[must_use]
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.contents.verification = Some(VerificationSpec {
            hash: Some(hash.into()),
        });
        self
    }

    /// Set the permission bits.
    #[must_use]
    pub const fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// Set the owning user and group.
    #[must_use]
    pub fn with_owner(mut self, user: OwnerSpec, group: OwnerSpec) -> Self {
        self.user = user;
        self.group = group;
        self
    }

    /// Set the compression hint.
    #[must_use]
    pub fn with_compression(mut self, compression: impl Into<String>) -> Self {
        self.contents.compression = Some(compression.into());
        self
    }
}
