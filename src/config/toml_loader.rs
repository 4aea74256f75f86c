//! TOML manifest parsing.
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ConfigError;

/// Load and deserialize a TOML file.
///
/// Generic loader used for the provisioning manifest.  Unlike optional
/// per-feature config files, a manifest that does not exist is an error: an
/// absent manifest almost always means a wrong `--config` path, and silently
/// provisioning nothing would hide that.
///
/// # Type Parameters
///
/// - `T`: Target type to deserialize into (must implement `DeserializeOwned`)
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::InvalidSyntax`] if it is not valid TOML for `T`.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_config(&content, &path.display().to_string())
}

/// Deserialize TOML text; `origin` names the source in error messages.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidSyntax`] if `content` does not parse as `T`.
pub fn parse_config<T: DeserializeOwned>(content: &str, origin: &str) -> Result<T, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::InvalidSyntax {
        file: origin.to_string(),
        message: e.message().to_string(),
    })
}
