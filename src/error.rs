//! Domain-specific error types for the provisioning engine.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Internal modules return typed errors while command handlers at the CLI
//! boundary convert them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! BootfilesError
//! ├── Config(ConfigError)            : manifest loading and validation
//! ├── Resolve(ResolveError)          : descriptor/identity resolution (fatal)
//! └── Materialize(MaterializeError)  : filesystem and transport work (recoverable)
//! ```
//!
//! # Failure policy
//!
//! Every error carries a [`Severity`].  The table that turns a severity into
//! "abort the run" or "continue with the next entry" is [`FailurePolicy`];
//! nothing below the command layer terminates the process.

use thiserror::Error;

use crate::resources::error::MaterializeError;
use crate::resources::identity::LookupError;
use crate::resources::verification::HashAlgo;

/// Top-level error type for the provisioning engine.
#[derive(Error, Debug)]
pub enum BootfilesError {
    /// Manifest loading or validation failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An entry could not be resolved into an executable plan.
    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// Writing an entry to disk failed.
    #[error("Materialization error: {0}")]
    Materialize(#[from] MaterializeError),
}

impl BootfilesError {
    /// Severity tier of this error.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Config(_) => Severity::Fatal,
            Self::Resolve(e) => e.severity(),
            Self::Materialize(_) => Severity::Recoverable,
        }
    }
}

/// Errors that arise from manifest loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The manifest contains a syntax or schema error.
    #[error("Invalid TOML in {file}: {message}")]
    InvalidSyntax {
        /// Manifest the error was found in.
        file: String,
        /// Parser message.
        message: String,
    },

    /// An I/O error occurred while reading the manifest.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Validation reported problems that would make resolution fail.
    #[error("{count} validation problem(s) in manifest")]
    Invalid {
        /// Number of validation warnings.
        count: usize,
    },
}

/// Errors that arise while turning a descriptor into a plan.
///
/// The manifest is validated before resolution, so every variant here means
/// an entry slipped past validation or the destination root's identity
/// database disagrees with the manifest.  Continuing could skip verification
/// or write files with the wrong owner, hence [`Severity::Fatal`].
#[derive(Error, Debug)]
pub enum ResolveError {
    /// A user name could not be found.
    #[error("no such user '{name}': {source}")]
    UnknownUser {
        /// Requested user name.
        name: String,
        /// Lookup failure.
        source: LookupError,
    },

    /// A group name could not be found.
    #[error("no such group '{name}': {source}")]
    UnknownGroup {
        /// Requested group name.
        name: String,
        /// Lookup failure.
        source: LookupError,
    },

    /// The identity database returned a uid that is not a number.
    #[error("couldn't parse uid '{value}' for user '{name}'")]
    InvalidUid {
        /// Requested user name.
        name: String,
        /// Raw id string.
        value: String,
    },

    /// The identity database returned a gid that is not a number.
    #[error("couldn't parse gid '{value}' for group '{name}'")]
    InvalidGid {
        /// Requested group name.
        name: String,
        /// Raw id string.
        value: String,
    },

    /// The source locator is not a URL.
    #[error("invalid source url '{url}': {error}")]
    InvalidSource {
        /// Source as written.
        url: String,
        /// Parser error.
        #[source]
        error: url::ParseError,
    },

    /// The verification algorithm is not supported.
    #[error("unsupported verification algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    /// The verification hash is not of the form `<algorithm>-<hex>`.
    #[error("malformed verification hash '{0}'")]
    MalformedVerification(String),

    /// The expected digest is not valid hex.
    #[error("error parsing verification digest '{digest}': {error}")]
    InvalidDigest {
        /// Digest as written.
        digest: String,
        /// Decoder error.
        #[source]
        error: hex::FromHexError,
    },

    /// The expected digest has the wrong size for its algorithm.
    #[error("{algorithm} digest must be {expected} bytes, got {actual}")]
    DigestLength {
        /// Algorithm named by the hash.
        algorithm: HashAlgo,
        /// Output size of the algorithm.
        expected: usize,
        /// Decoded digest size.
        actual: usize,
    },

    /// The compression hint is not supported.
    #[error("unsupported compression '{0}'")]
    UnsupportedCompression(String),
}

impl ResolveError {
    /// Resolution failures are always fatal.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        Severity::Fatal
    }
}

/// How serious a failure is for the provisioning run as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The run cannot be trusted to continue.
    Fatal,
    /// Only the current entry failed.
    Recoverable,
}

/// What the command layer does after an entry fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Stop processing entries.
    Abort,
    /// Move on to the next entry; the run still fails at the end.
    Continue,
}

/// The single table mapping error severity to run disposition.
///
/// | severity      | `keep_going = false` | `keep_going = true` |
/// |---------------|----------------------|---------------------|
/// | `Fatal`       | abort                | abort               |
/// | `Recoverable` | abort                | continue            |
///
/// # Examples
///
/// ```
/// use bootfiles_cli::error::{Disposition, FailurePolicy, Severity};
///
/// let policy = FailurePolicy { keep_going: true };
/// assert_eq!(policy.disposition(Severity::Fatal), Disposition::Abort);
/// assert_eq!(policy.disposition(Severity::Recoverable), Disposition::Continue);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailurePolicy {
    /// Continue past recoverable failures.
    pub keep_going: bool,
}

impl FailurePolicy {
    /// Decide what to do after a failure of the given severity.
    #[must_use]
    pub const fn disposition(&self, severity: Severity) -> Disposition {
        match (severity, self.keep_going) {
            (Severity::Fatal, _) | (Severity::Recoverable, false) => Disposition::Abort,
            (Severity::Recoverable, true) => Disposition::Continue,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    // -----------------------------------------------------------------------
    // ConfigError
    // -----------------------------------------------------------------------

    #[test]
    fn config_error_invalid_syntax_display() {
        let e = ConfigError::InvalidSyntax {
            file: "manifest.toml".to_string(),
            message: "unexpected token".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "Invalid TOML in manifest.toml: unexpected token"
        );
    }

    #[test]
    fn config_error_io_has_source() {
        use std::error::Error as StdError;
        let e = ConfigError::Io {
            path: "/boot/manifest.toml".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(e.to_string().contains("/boot/manifest.toml"));
        assert!(e.source().is_some());
    }

    // -----------------------------------------------------------------------
    // ResolveError
    // -----------------------------------------------------------------------

    #[test]
    fn resolve_error_unknown_user_display() {
        let e = ResolveError::UnknownUser {
            name: "core".to_string(),
            source: LookupError::NotFound {
                database: "passwd",
                name: "core".to_string(),
            },
        };
        assert!(e.to_string().starts_with("no such user 'core'"));
    }

    #[test]
    fn resolve_error_digest_length_display() {
        let e = ResolveError::DigestLength {
            algorithm: HashAlgo::Sha512,
            expected: 64,
            actual: 2,
        };
        assert_eq!(e.to_string(), "sha512 digest must be 64 bytes, got 2");
    }

    #[test]
    fn resolve_error_invalid_digest_has_source() {
        use std::error::Error as StdError;
        let error = hex::decode("zz").expect_err("invalid hex");
        let e = ResolveError::InvalidDigest {
            digest: "zz".to_string(),
            error,
        };
        assert!(e.source().is_some());
    }

    // -----------------------------------------------------------------------
    // Severity and policy
    // -----------------------------------------------------------------------

    #[test]
    fn resolve_and_config_errors_are_fatal() {
        let e: BootfilesError = ResolveError::UnsupportedCompression("xz".to_string()).into();
        assert_eq!(e.severity(), Severity::Fatal);
        let e: BootfilesError = ConfigError::Invalid { count: 1 }.into();
        assert_eq!(e.severity(), Severity::Fatal);
    }

    #[test]
    fn wrapped_resolve_error_keeps_its_severity() {
        let inner = ResolveError::UnsupportedCompression("xz".to_string());
        let expected = inner.severity();
        assert_eq!(BootfilesError::from(inner).severity(), expected);
    }

    #[test]
    fn materialize_errors_are_recoverable() {
        let e: BootfilesError = MaterializeError::CreateDir {
            path: "/a".into(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        }
        .into();
        assert_eq!(e.severity(), Severity::Recoverable);
        assert!(e.to_string().contains("Materialization error"));
    }

    #[test]
    fn policy_table() {
        let strict = FailurePolicy::default();
        let lenient = FailurePolicy { keep_going: true };
        assert_eq!(strict.disposition(Severity::Fatal), Disposition::Abort);
        assert_eq!(strict.disposition(Severity::Recoverable), Disposition::Abort);
        assert_eq!(lenient.disposition(Severity::Fatal), Disposition::Abort);
        assert_eq!(
            lenient.disposition(Severity::Recoverable),
            Disposition::Continue
        );
    }

    // -----------------------------------------------------------------------
    // Send + Sync bounds
    // -----------------------------------------------------------------------

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<BootfilesError>();
        assert_send_sync::<ConfigError>();
        assert_send_sync::<ResolveError>();
    }

    #[test]
    fn resolve_error_converts_to_anyhow() {
        let e = ResolveError::UnsupportedAlgorithm("md5".to_string());
        let _anyhow_err: anyhow::Error = e.into();
    }
}
