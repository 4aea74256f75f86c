//! Provisioning manifest: declarative file and link entries.
pub mod files;
pub mod links;
pub mod owner;
pub mod toml_loader;
pub mod validation;

use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;

/// All entries declared by a manifest.
///
/// ```toml
/// [[files]]
/// path = "/etc/hostname"
/// mode = 0o644
/// contents = { source = "data:,node1" }
///
/// [[links]]
/// path = "/etc/localtime"
/// target = "../usr/share/zoneinfo/UTC"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Files to materialize, in declaration order.
    #[serde(default)]
    pub files: Vec<files::FileEntry>,
    /// Links to create after all files, in declaration order.
    #[serde(default)]
    pub links: Vec<links::LinkEntry>,
}

impl Config {
    /// Load a manifest from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid manifest.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        toml_loader::load_config(path)
    }

    /// Run every validator over the manifest.
    #[must_use]
    pub fn validate(&self) -> Vec<validation::ValidationWarning> {
        validation::validate_all(self)
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len() + self.links.len()
    }

    /// Returns `true` if the manifest declares nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.links.is_empty()
    }
}


#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use test_helpers::write_temp_toml;

    #[test]
    fn load_files_and_links() {
        let (_dir, path) = write_temp_toml(
            r#"[[files]]
path = "/etc/hostname"
contents = { source = "data:,node1" }

[[files]]
path = "/etc/motd"
mode = 0o600

[[links]]
path = "/etc/localtime"
target = "../usr/share/zoneinfo/UTC"
"#,
        );
        let config = Config::load(&path).unwrap();
        assert_eq!(config.files.len(), 2);
        assert_eq!(config.links.len(), 1);
        assert_eq!(config.len(), 3);
        assert_eq!(config.files[1].mode, 0o600);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn empty_manifest_is_empty() {
        let (_dir, path) = write_temp_toml("");
        let config = Config::load(&path).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn unknown_top_level_key_is_rejected() {
        let (_dir, path) = write_temp_toml("[[directories]]\npath = \"/x\"\n");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSyntax { .. }));
    }
}
