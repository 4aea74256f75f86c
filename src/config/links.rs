//! Link entry configuration.
use serde::Deserialize;

use super::owner::OwnerSpec;

/// A hard or symbolic link to create under the destination root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkEntry {
    /// Absolute path of the link itself, relative to the destination root.
    pub path: String,
    /// What the link points to.  Stored verbatim for symbolic links; joined
    /// under the destination root for hard links.
    pub target: String,
    /// Create a hard link instead of a symbolic one.
    #[serde(default)]
    pub hard: bool,
    /// Owning user of a symbolic link entry.  Ignored for hard links.
    #[serde(default)]
    pub user: OwnerSpec,
    /// Owning group of a symbolic link entry.  Ignored for hard links.
    #[serde(default)]
    pub group: OwnerSpec,
}

impl LinkEntry {
    /// A symbolic link owned by root.
    #[must_use]
    pub fn symbolic(path: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            target: target.into(),
            hard: false,
            user: OwnerSpec::default(),
            group: OwnerSpec::default(),
        }
    }

    /// A hard link.
    #[must_use]
    pub fn hard(path: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            hard: true,
            ..Self::symbolic(path, target)
        }
    }
}
