//! Content verification: hash algorithms and expected digests.
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::str::FromStr;

use crate::config::files::VerificationSpec;
use crate::error::ResolveError;

/// Supported verification algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgo {
    /// SHA-256.
    Sha256,
    /// SHA-512.
    Sha512,
}

impl HashAlgo {
    /// Size of the algorithm's output in bytes.
    #[must_use]
    pub const fn digest_len(self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }
}

impl fmt::Display for HashAlgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha256 => f.write_str("sha256"),
            Self::Sha512 => f.write_str("sha512"),
        }
    }
}

impl FromStr for HashAlgo {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            other => Err(ResolveError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Running digest over streamed bytes.
#[derive(Clone)]
pub enum Hasher {
    /// SHA-256 state.
    Sha256(Sha256),
    /// SHA-512 state.
    Sha512(Sha512),
}

impl Hasher {
    /// Fresh state for `algo`.
    #[must_use]
    pub fn new(algo: HashAlgo) -> Self {
        match algo {
            HashAlgo::Sha256 => Self::Sha256(Sha256::new()),
            HashAlgo::Sha512 => Self::Sha512(Sha512::new()),
        }
    }

    /// Algorithm this state computes.
    #[must_use]
    pub const fn algo(&self) -> HashAlgo {
        match self {
            Self::Sha256(_) => HashAlgo::Sha256,
            Self::Sha512(_) => HashAlgo::Sha512,
        }
    }

    /// Feed bytes into the digest.
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
        }
    }

    /// Digest of everything fed so far.  The state itself is left untouched.
    #[must_use]
    pub fn digest(&self) -> Vec<u8> {
        match self {
            Self::Sha256(h) => h.clone().finalize().to_vec(),
            Self::Sha512(h) => h.clone().finalize().to_vec(),
        }
    }
}

impl fmt::Debug for Hasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Hasher").field(&self.algo()).finish()
    }
}

/// Whether fetched content is checked, and against what.
#[derive(Debug, Clone)]
pub enum Verification {
    /// No verification was requested.
    Skip,
    /// Hash every byte and compare against `expected`.
    Verify {
        /// Digest state fed by the transfer.
        hasher: Hasher,
        /// Raw expected digest, always `hasher.algo().digest_len()` bytes.
        expected: Vec<u8>,
    },
}

impl Verification {
    /// The expected digest, empty for [`Verification::Skip`].
    #[must_use]
    pub fn expected(&self) -> &[u8] {
        match self {
            Self::Skip => &[],
            Self::Verify { expected, .. } => expected,
        }
    }

    /// Returns `true` if content will be checked.
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        matches!(self, Self::Verify { .. })
    }

    /// Split into the mutable hasher and expected digest for a transfer.
    pub fn parts_mut(&mut self) -> (Option<&mut Hasher>, &[u8]) {
        match self {
            Self::Skip => (None, &[]),
            Self::Verify { hasher, expected } => (Some(hasher), expected),
        }
    }
}

/// Resolve an optional verification spec.
///
/// # Errors
///
/// Fails when the hash string is malformed, names an unknown algorithm,
/// is not hex, or has the wrong length for its algorithm.
pub fn resolve_verification(spec: Option<&VerificationSpec>) -> Result<Verification, ResolveError> {
    let Some(raw) = spec.and_then(|s| s.hash.as_deref()) else {
        return Ok(Verification::Skip);
    };
    let Some((algo, digest)) = raw.split_once('-') else {
        return Err(ResolveError::MalformedVerification(raw.to_string()));
    };
    let algo: HashAlgo = algo.parse()?;
    let expected = hex::decode(digest).map_err(|error| ResolveError::InvalidDigest {
        digest: digest.to_string(),
        error,
    })?;
    if expected.len() != algo.digest_len() {
        return Err(ResolveError::DigestLength {
            algorithm: algo,
            expected: algo.digest_len(),
            actual: expected.len(),
        });
    }
    Ok(Verification::Verify {
        hasher: Hasher::new(algo),
        expected,
    })
}
