//! Byte transport for file contents.
//!
//! A [`Fetcher`] streams the bytes named by a source URL into a
//! [`TeeWriter`], which writes them to the destination while feeding the
//! verification hasher.  The transport decompresses before hashing and
//! fails with [`FetchError::DigestMismatch`] when the computed digest differs
//! from the expected one.
pub mod data;
pub mod http;

use flate2::read::MultiGzDecoder;
use std::io::{self, Read, Write};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::resources::verification::Hasher;

/// URL schemes the default transport can read from.
pub const SUPPORTED_SCHEMES: &[&str] = &["http", "https", "data", "file"];

/// Errors returned by a [`Fetcher`].
#[derive(Error, Debug)]
pub enum FetchError {
    /// The source URL uses a scheme no transport handles.
    #[error("unsupported source scheme '{0}'")]
    UnsupportedScheme(String),

    /// An HTTP request failed or returned a non-success status.
    #[error("requesting {url}: {source}")]
    Http {
        /// Requested URL.
        url: String,
        /// Client error.
        source: Box<ureq::Error>,
    },

    /// A `data:` URL could not be decoded.
    #[error("decoding data url: {0}")]
    DataUrl(String),

    /// A `file:` URL does not name a local path.
    #[error("'{0}' is not a local file path")]
    FileUrl(String),

    /// The fetched content does not match the expected digest.
    #[error("digest mismatch: expected {expected}, computed {computed}")]
    DigestMismatch {
        /// Expected digest, hex encoded.
        expected: String,
        /// Computed digest, hex encoded.
        computed: String,
    },

    /// Reading the source or writing the destination failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Compression applied to source bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    /// Bytes are stored as-is.
    #[default]
    None,
    /// Bytes are a gzip stream, possibly of several concatenated members.
    Gzip,
}

/// Per-transfer options handed to a [`Fetcher`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions<'a> {
    /// Compression of the source bytes.
    pub compression: Compression,
    /// Expected digest of the decompressed bytes; empty disables the check.
    pub expected_sum: &'a [u8],
}

/// Writer that copies every byte into an optional hasher.
pub struct TeeWriter<'a> {
    inner: &'a mut dyn Write,
    hasher: Option<&'a mut Hasher>,
    written: u64,
}

impl<'a> TeeWriter<'a> {
    /// Wrap `inner`, hashing written bytes when `hasher` is present.
    pub fn new(inner: &'a mut dyn Write, hasher: Option<&'a mut Hasher>) -> Self {
        Self {
            inner,
            hasher,
            written: 0,
        }
    }

    /// Number of bytes accepted so far.
    #[must_use]
    pub const fn written(&self) -> u64 {
        self.written
    }

    /// Digest of the bytes written so far, if hashing.
    #[must_use]
    pub fn digest(&self) -> Option<Vec<u8>> {
        self.hasher.as_deref().map(Hasher::digest)
    }

    /// Compare the running digest with `expected`.
    ///
    /// An empty `expected` always passes.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::DigestMismatch`] when the digests differ or when
    /// a digest was expected but nothing was hashed.
    pub fn verify(&self, expected: &[u8]) -> Result<(), FetchError> {
        if expected.is_empty() {
            return Ok(());
        }
        let computed = self.digest().unwrap_or_default();
        if computed == expected {
            Ok(())
        } else {
            Err(FetchError::DigestMismatch {
                expected: hex::encode(expected),
                computed: hex::encode(computed),
            })
        }
    }
}

impl std::fmt::Debug for TeeWriter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeeWriter")
            .field("hasher", &self.hasher)
            .field("written", &self.written)
            .finish_non_exhaustive()
    }
}

impl Write for TeeWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        if let Some(accepted) = buf.get(..n) {
            if let Some(hasher) = self.hasher.as_deref_mut() {
                hasher.update(accepted);
            }
            self.written += accepted.len() as u64;
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Transport that writes the bytes named by a source into a destination.
pub trait Fetcher: Send + Sync {
    /// Stream `source` into `dest`, decompressing and verifying per `opts`.
    ///
    /// A `None` source produces an empty file.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read, the destination cannot
    /// be written, or the content does not match `opts.expected_sum`.
    fn fetch(
        &self,
        source: Option<&Url>,
        dest: &mut TeeWriter<'_>,
        opts: &FetchOptions<'_>,
    ) -> Result<(), FetchError>;
}

/// Copy `reader` into `dest`, decompressing first, then check the digest.
///
/// # Errors
///
/// Returns an error on I/O failure or digest mismatch.
pub fn copy_verified(
    reader: &mut dyn Read,
    dest: &mut TeeWriter<'_>,
    opts: &FetchOptions<'_>,
) -> Result<(), FetchError> {
    match opts.compression {
        Compression::None => io::copy(reader, dest)?,
        Compression::Gzip => io::copy(&mut MultiGzDecoder::new(reader), dest)?,
    };
    dest.flush()?;
    dest.verify(opts.expected_sum)
}

/// Connection timeout for HTTP sources.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Whole-transfer timeout for HTTP sources.
const TRANSFER_TIMEOUT: Duration = Duration::from_secs(300);

/// Default transport for `http`, `https`, `data`, and `file` sources.
#[derive(Debug)]
pub struct UrlFetcher {
    http: http::HttpClient,
}

impl Default for UrlFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlFetcher {
    /// Create a transport with the default timeouts.
    #[must_use]
    pub fn new() -> Self {
        Self {
            http: http::HttpClient::new(CONNECT_TIMEOUT, TRANSFER_TIMEOUT),
        }
    }
}

impl Fetcher for UrlFetcher {
    fn fetch(
        &self,
        source: Option<&Url>,
        dest: &mut TeeWriter<'_>,
        opts: &FetchOptions<'_>,
    ) -> Result<(), FetchError> {
        let Some(url) = source else {
            return copy_verified(&mut io::empty(), dest, opts);
        };
        match url.scheme() {
            "http" | "https" => {
                let mut body = self.http.open(url)?;
                copy_verified(&mut body, dest, opts)
            }
            "data" => {
                let payload = data::decode(url)?;
                copy_verified(&mut payload.as_slice(), dest, opts)
            }
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|()| FetchError::FileUrl(url.to_string()))?;
                let mut file = std::fs::File::open(path)?;
                copy_verified(&mut file, dest, opts)
            }
            other => Err(FetchError::UnsupportedScheme(other.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::resources::verification::HashAlgo;
    use flate2::write::GzEncoder;

    fn sha256(data: &[u8]) -> Vec<u8> {
        let mut hasher = Hasher::new(HashAlgo::Sha256);
        hasher.update(data);
        hasher.digest()
    }

    fn fetch_to_vec(
        source: Option<&str>,
        expected: &[u8],
        compression: Compression,
    ) -> Result<Vec<u8>, FetchError> {
        let url = source.map(|s| Url::parse(s).unwrap());
        let mut out = Vec::new();
        let mut hasher = Hasher::new(HashAlgo::Sha256);
        let hasher = (!expected.is_empty()).then_some(&mut hasher);
        let mut tee = TeeWriter::new(&mut out, hasher);
        let opts = FetchOptions {
            compression,
            expected_sum: expected,
        };
        UrlFetcher::new().fetch(url.as_ref(), &mut tee, &opts)?;
        Ok(out)
    }

    #[test]
    fn tee_writer_hashes_what_it_writes() {
        let mut out = Vec::new();
        let mut hasher = Hasher::new(HashAlgo::Sha256);
        let mut tee = TeeWriter::new(&mut out, Some(&mut hasher));
        tee.write_all(b"hello world").unwrap();
        assert_eq!(tee.written(), 11);
        assert!(tee.verify(&sha256(b"hello world")).is_ok());
        assert!(matches!(
            tee.verify(&sha256(b"other")),
            Err(FetchError::DigestMismatch { .. })
        ));
        drop(tee);
        assert_eq!(out, b"hello world");
    }

    #[test]
    fn verify_without_hasher_fails_when_digest_expected() {
        let mut out = Vec::new();
        let tee = TeeWriter::new(&mut out, None);
        assert!(tee.verify(&[]).is_ok());
        assert!(tee.verify(&[0u8; 32]).is_err());
    }

    #[test]
    fn missing_source_yields_empty_content() {
        let out = fetch_to_vec(None, &[], Compression::None).unwrap();
        assert!(out.is_empty());
        let out = fetch_to_vec(None, &sha256(b""), Compression::None).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn data_source_is_verified() {
        let out = fetch_to_vec(Some("data:,node1"), &sha256(b"node1"), Compression::None).unwrap();
        assert_eq!(out, b"node1");

        let err = fetch_to_vec(Some("data:,node2"), &sha256(b"node1"), Compression::None)
            .unwrap_err();
        assert!(matches!(err, FetchError::DigestMismatch { .. }));
    }

    #[test]
    fn file_source_is_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("src.txt");
        std::fs::write(&path, "from disk").unwrap();
        let url = Url::from_file_path(&path).unwrap();
        let out = fetch_to_vec(Some(url.as_str()), &[], Compression::None).unwrap();
        assert_eq!(out, b"from disk");
    }

    #[test]
    fn gzip_is_decompressed_before_hashing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("src.gz");
        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"compressed payload").unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        let url = Url::from_file_path(&path).unwrap();
        let out = fetch_to_vec(
            Some(url.as_str()),
            &sha256(b"compressed payload"),
            Compression::Gzip,
        )
        .unwrap();
        assert_eq!(out, b"compressed payload");
    }

    #[test]
    fn gzip_reads_every_member() {
        let mut stream = Vec::new();
        for part in [b"first member\n".as_slice(), b"second member\n"] {
            let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(part).unwrap();
            stream.extend(encoder.finish().unwrap());
        }

        let mut out = Vec::new();
        let mut tee = TeeWriter::new(&mut out, None);
        let opts = FetchOptions {
            compression: Compression::Gzip,
            expected_sum: &[],
        };
        copy_verified(&mut stream.as_slice(), &mut tee, &opts).unwrap();
        assert_eq!(tee.written(), 27);
        drop(tee);
        assert_eq!(out, b"first member\nsecond member\n");
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        let err = fetch_to_vec(Some("ftp://example.com/x"), &[], Compression::None).unwrap_err();
        assert!(matches!(err, FetchError::UnsupportedScheme(ref s) if s == "ftp"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn fetch_error_is_send_sync() {
        assert_send_sync::<FetchError>();
    }
}
