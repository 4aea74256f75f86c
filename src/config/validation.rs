//! Manifest validation run before any entry is resolved.
use std::collections::HashSet;
use std::path::Path;

use crate::fetch::SUPPORTED_SCHEMES;
use crate::resources::helpers::fs::clean_relative;
use crate::resources::verification::HashAlgo;

/// Highest permission value accepted for a file entry (`rwxrwxrwx` plus
/// setuid, setgid, and sticky bits).
const MAX_MODE: u32 = 0o7777;

/// A validation warning detected during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The configuration section (`"files"` or `"links"`).
    pub source: String,
    /// The specific item that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Create a warning for `item` in section `source`.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            item: item.into(),
            message: message.into(),
        }
    }
}

/// Trait for configuration validators.
///
/// Validation runs before any entry is resolved.  Everything reported here
/// would otherwise surface later as a fatal resolution error, so `apply`
/// refuses to start while warnings remain.
pub trait ConfigValidator {
    /// Validate the configuration and return any warnings found.
    fn validate(&self) -> Vec<ValidationWarning>;

    /// Return a human-readable name for this validator (e.g., "files").
    fn name(&self) -> &'static str;
}

/// Validator for file entries.
#[derive(Debug)]
pub struct FileValidator<'a> {
    files: &'a [super::files::FileEntry],
}

impl<'a> FileValidator<'a> {
    /// Validate the given files.
    #[must_use]
    pub const fn new(files: &'a [super::files::FileEntry]) -> Self {
        Self { files }
    }
}

impl ConfigValidator for FileValidator<'_> {
    fn validate(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for file in self.files {
            let mut warn = |message: String| {
                warnings.push(ValidationWarning::new("files", &file.path, message));
            };

            if let Some(message) = validate_target_path(&file.path) {
                warn(message);
            }

            if file.mode > MAX_MODE {
                warn(format!("mode {:o} exceeds {MAX_MODE:o}", file.mode));
            }

            if let Some(source) = file.contents.source.as_deref().filter(|s| !s.is_empty())
                && let Some(message) = validate_source(source)
            {
                warn(message);
            }

            if let Some(spec) = &file.contents.verification
                && spec.hash.is_some()
                && let Some(message) = validate_hash(spec)
            {
                warn(message);
            }

            match file.contents.compression.as_deref() {
                None | Some("" | "gzip") => {}
                Some(other) => warn(format!("unsupported compression '{other}'")),
            }
        }

        warnings
    }

    fn name(&self) -> &'static str {
        "files"
    }
}

/// Validator for link entries.
#[derive(Debug)]
pub struct LinkValidator<'a> {
    links: &'a [super::links::LinkEntry],
}

impl<'a> LinkValidator<'a> {
    /// Validate the given links.
    #[must_use]
    pub const fn new(links: &'a [super::links::LinkEntry]) -> Self {
        Self { links }
    }
}

impl ConfigValidator for LinkValidator<'_> {
    fn validate(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for link in self.links {
            let mut warn = |message: String| {
                warnings.push(ValidationWarning::new("links", &link.path, message));
            };

            if let Some(message) = validate_target_path(&link.path) {
                warn(message);
            }

            if link.target.is_empty() {
                warn("link target is empty".to_string());
            }

            if link.hard {
                if let Some(message) = validate_target_path(&link.target) {
                    warn(format!("hard link target: {message}"));
                }
                if !link.user.is_unset() || !link.group.is_unset() {
                    warn("owner is ignored for hard links".to_string());
                }
            }
        }

        warnings
    }

    fn name(&self) -> &'static str {
        "links"
    }
}

/// Validator for paths claimed by more than one entry.
#[derive(Debug)]
pub struct DuplicatePathValidator<'a> {
    config: &'a super::Config,
}

impl<'a> DuplicatePathValidator<'a> {
    /// Validate the given config.
    #[must_use]
    pub const fn new(config: &'a super::Config) -> Self {
        Self { config }
    }
}

impl ConfigValidator for DuplicatePathValidator<'_> {
    fn validate(&self) -> Vec<ValidationWarning> {
        let mut seen = HashSet::new();
        let paths = self
            .config
            .files
            .iter()
            .map(|f| ("files", f.path.as_str()))
            .chain(self.config.links.iter().map(|l| ("links", l.path.as_str())));

        paths
            .filter(|(_, path)| !seen.insert(clean_relative(path)))
            .map(|(section, path)| {
                ValidationWarning::new(section, path, "path is declared more than once")
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "duplicates"
    }
}

/// Returns `Some(error_message)` if `path` is not a usable target path.
fn validate_target_path(path: &str) -> Option<String> {
    if path.is_empty() {
        return Some("path is empty".to_string());
    }
    if !Path::new(path).is_absolute() {
        return Some("path must be absolute".to_string());
    }
    if path.split('/').any(|part| part == "." || part == "..") {
        return Some("path must not contain '.' or '..' components".to_string());
    }
    if clean_relative(path).as_os_str().is_empty() {
        return Some("path must name an entry below the root".to_string());
    }
    if path.ends_with('/') {
        return Some("path must not end with '/'".to_string());
    }
    None
}

/// Returns `Some(error_message)` if `source` is not a fetchable URL.
fn validate_source(source: &str) -> Option<String> {
    match url::Url::parse(source) {
        Ok(url) if SUPPORTED_SCHEMES.contains(&url.scheme()) => None,
        Ok(url) => Some(format!("unsupported source scheme '{}'", url.scheme())),
        Err(e) => Some(format!("invalid source url '{source}': {e}")),
    }
}

/// Returns `Some(error_message)` if the verification hash is malformed.
fn validate_hash(spec: &super::files::VerificationSpec) -> Option<String> {
    let Some((algo, digest)) = spec.hash_parts() else {
        return Some("verification hash must have the form <algorithm>-<hex>".to_string());
    };
    let algo = match algo.parse::<HashAlgo>() {
        Ok(algo) => algo,
        Err(e) => return Some(e.to_string()),
    };
    match hex::decode(digest) {
        Ok(bytes) if bytes.len() == algo.digest_len() => None,
        Ok(bytes) => Some(format!(
            "{algo} digest must be {} bytes, got {}",
            algo.digest_len(),
            bytes.len()
        )),
        Err(e) => Some(format!("verification digest is not valid hex: {e}")),
    }
}

/// Validate all configuration and return collected warnings.
#[must_use]
pub fn validate_all(config: &super::Config) -> Vec<ValidationWarning> {
    let validators: Vec<Box<dyn ConfigValidator>> = vec![
        Box::new(FileValidator::new(&config.files)),
        Box::new(LinkValidator::new(&config.links)),
        Box::new(DuplicatePathValidator::new(config)),
    ];

    let mut all_warnings = Vec::new();
    for validator in validators {
        let warnings = validator.validate();
        tracing::debug!("{} validator: {} warning(s)", validator.name(), warnings.len());
        all_warnings.extend(warnings);
    }

    all_warnings
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::config::files::FileEntry;
    use crate::config::links::LinkEntry;
    use crate::config::owner::OwnerSpec;

    fn sha512_hex() -> String {
        "ab".repeat(64)
    }

    #[test]
    fn valid_file_has_no_warnings() {
        let files = vec![
            FileEntry::new("/etc/hostname")
                .with_source("https://example.com/hostname")
                .with_hash(format!("sha512-{}", sha512_hex())),
        ];
        assert!(FileValidator::new(&files).validate().is_empty());
    }

    #[test]
    fn file_validator_detects_relative_path() {
        let files = vec![FileEntry::new("etc/hostname")];
        let warnings = FileValidator::new(&files).validate();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("absolute"));
    }

    #[test]
    fn file_validator_detects_bad_source() {
        let files = vec![
            FileEntry::new("/a").with_source("not a url"),
            FileEntry::new("/b").with_source("gopher://x/y"),
        ];
        let warnings = FileValidator::new(&files).validate();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].message.contains("invalid source url"));
        assert!(warnings[1].message.contains("unsupported source scheme"));
    }

    #[test]
    fn file_validator_detects_malformed_hash() {
        let files = vec![
            FileEntry::new("/a").with_hash("sha512"),
            FileEntry::new("/b").with_hash("md5-00"),
            FileEntry::new("/c").with_hash("sha512-zz"),
            FileEntry::new("/d").with_hash("sha512-abcd"),
        ];
        let warnings = FileValidator::new(&files).validate();
        assert_eq!(warnings.len(), 4);
        assert!(warnings[0].message.contains("<algorithm>-<hex>"));
        assert!(warnings[1].message.contains("md5"));
        assert!(warnings[2].message.contains("not valid hex"));
        assert!(warnings[3].message.contains("64 bytes"));
    }

    #[test]
    fn file_validator_detects_mode_and_compression() {
        let files = vec![
            FileEntry::new("/a").with_mode(0o17777),
            FileEntry::new("/b").with_compression("xz"),
        ];
        let warnings = FileValidator::new(&files).validate();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].message.contains("exceeds"));
        assert!(warnings[1].message.contains("xz"));
    }

    #[test]
    fn link_validator_checks_hard_links() {
        let mut owned = LinkEntry::hard("/a", "/b");
        owned.user = OwnerSpec::named("core");
        let links = vec![LinkEntry::hard("/c", "relative"), owned];
        let warnings = LinkValidator::new(&links).validate();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].message.contains("absolute"));
        assert!(warnings[1].message.contains("ignored"));
    }

    #[test]
    fn paths_collapsing_to_root_are_rejected() {
        let files = vec![
            FileEntry::new("/etc/.."),
            FileEntry::new("/a/../."),
            FileEntry::new("/etc/./hostname"),
            FileEntry::new("/"),
        ];
        let warnings = FileValidator::new(&files).validate();
        assert_eq!(warnings.len(), 4);
        assert!(warnings[0].message.contains("'..'"));
        assert!(warnings[1].message.contains("'..'"));
        assert!(warnings[2].message.contains("'.'"));
        assert!(warnings[3].message.contains("below the root"));
    }

    #[test]
    fn hard_link_target_must_stay_below_root() {
        let links = vec![LinkEntry::hard("/bin/x", "/usr/..")];
        let warnings = LinkValidator::new(&links).validate();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.starts_with("hard link target:"));
    }

    #[test]
    fn symbolic_link_target_may_be_relative() {
        let links = vec![LinkEntry::symbolic("/etc/localtime", "../usr/share/zoneinfo/UTC")];
        assert!(LinkValidator::new(&links).validate().is_empty());
    }

    #[test]
    fn duplicate_paths_are_reported() {
        let config = Config {
            files: vec![FileEntry::new("/etc/x")],
            links: vec![LinkEntry::symbolic("/etc/x", "y")],
        };
        let warnings = validate_all(&config);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].source, "links");
        assert!(warnings[0].message.contains("more than once"));
    }

    #[test]
    fn duplicate_paths_are_compared_after_cleaning() {
        let config = Config {
            files: vec![FileEntry::new("/etc/x"), FileEntry::new("/etc//x")],
            links: vec![],
        };
        let warnings = DuplicatePathValidator::new(&config).validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].item, "/etc//x");
    }
}
