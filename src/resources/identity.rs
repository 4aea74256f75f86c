//! User and group identity resolution.
//!
//! Owner specs name a user or group either symbolically or by numeric id.
//! Symbolic names are looked up in an [`IdentityDb`]; by default that is
//! [`PasswdDb`], which reads `etc/passwd` and `etc/group` inside the
//! destination root so that names resolve against the system being
//! provisioned rather than the one doing the provisioning.
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::owner::OwnerSpec;
use crate::error::ResolveError;

/// A resolved numeric owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Identity {
    /// Numeric user id.
    pub uid: u32,
    /// Numeric group id.
    pub gid: u32,
}

impl Identity {
    /// The superuser identity, `0:0`.
    pub const ROOT: Self = Self { uid: 0, gid: 0 };

    /// Create an identity from raw ids.
    #[must_use]
    pub const fn new(uid: u32, gid: u32) -> Self {
        Self { uid, gid }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.uid, self.gid)
    }
}

/// A record returned by the identity database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdRecord {
    /// The id exactly as stored in the database.
    pub id: String,
}

/// Errors returned by an [`IdentityDb`] lookup.
#[derive(Error, Debug)]
pub enum LookupError {
    /// The name is not present in the database.
    #[error("{name} not found in {database}")]
    NotFound {
        /// Database that was searched (`"passwd"` or `"group"`).
        database: &'static str,
        /// Name that was searched for.
        name: String,
    },

    /// The database file could not be read.
    #[error("reading {}: {source}", .path.display())]
    Io {
        /// Database file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Source of user and group records.
#[cfg_attr(test, mockall::automock)]
pub trait IdentityDb: Send + Sync {
    /// Look up a user by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the database is unreadable.
    fn lookup_user(&self, name: &str) -> Result<IdRecord, LookupError>;

    /// Look up a group by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the group does not exist or the database is unreadable.
    fn lookup_group(&self, name: &str) -> Result<IdRecord, LookupError>;
}

/// [`IdentityDb`] backed by the `passwd` and `group` files of a root tree.
#[derive(Debug, Clone)]
pub struct PasswdDb {
    root: PathBuf,
}

impl PasswdDb {
    /// Read databases from `<root>/etc/passwd` and `<root>/etc/group`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn lookup(&self, database: &'static str, name: &str) -> Result<IdRecord, LookupError> {
        let path = self.root.join("etc").join(database);
        let content = std::fs::read_to_string(&path).map_err(|source| LookupError::Io {
            path: path.clone(),
            source,
        })?;
        find_id(&content, name).map_or_else(
            || {
                Err(LookupError::NotFound {
                    database,
                    name: name.to_string(),
                })
            },
            |id| Ok(IdRecord { id: id.to_string() }),
        )
    }
}

impl IdentityDb for PasswdDb {
    fn lookup_user(&self, name: &str) -> Result<IdRecord, LookupError> {
        self.lookup("passwd", name)
    }

    fn lookup_group(&self, name: &str) -> Result<IdRecord, LookupError> {
        self.lookup("group", name)
    }
}

/// Find the id (third `:`-separated field) of `name` in a passwd/group file.
fn find_id<'a>(content: &'a str, name: &str) -> Option<&'a str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .find_map(|line| {
            let mut fields = line.split(':');
            (fields.next()? == name).then_some(())?;
            fields.nth(1)
        })
}

/// Parse a numeric id with base auto-detection.
///
/// Accepts decimal, `0x` hexadecimal, `0o` or leading-zero octal, and `0b`
/// binary, with an optional leading `+` and `_` separators between digits.
/// Returns `None` for negative, empty, malformed, or out-of-range values.
///
/// # Examples
///
/// ```
/// use bootfiles_cli::resources::identity::parse_id;
///
/// assert_eq!(parse_id("1000"), Some(1000));
/// assert_eq!(parse_id("0x3e8"), Some(1000));
/// assert_eq!(parse_id("01750"), Some(1000));
/// assert_eq!(parse_id("-1"), None);
/// ```
#[must_use]
pub fn parse_id(raw: &str) -> Option<u32> {
    let s = raw.strip_prefix('+').unwrap_or(raw);
    let (radix, digits) = if let Some(rest) = strip_prefix_ci(s, "0x") {
        (16, rest.strip_prefix('_').unwrap_or(rest))
    } else if let Some(rest) = strip_prefix_ci(s, "0o") {
        (8, rest.strip_prefix('_').unwrap_or(rest))
    } else if let Some(rest) = strip_prefix_ci(s, "0b") {
        (2, rest.strip_prefix('_').unwrap_or(rest))
    } else if s.len() > 1 && s.starts_with('0') {
        (8, s.get(1..)?)
    } else {
        (10, s)
    };

    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
    {
        return None;
    }
    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    // from_str_radix tolerates a sign; the only permitted sign was consumed above.
    if cleaned.starts_with(['+', '-']) {
        return None;
    }
    u32::from_str_radix(&cleaned, radix).ok()
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| s.get(prefix.len()..))
        .flatten()
}

/// Resolve user and group owner specs to a numeric identity.
///
/// Each half is resolved independently: a name is looked up in `db`, an
/// explicit id is used as-is, and an empty spec defaults to `0`.  Either half
/// failing fails the whole resolution.
///
/// # Errors
///
/// Returns [`ResolveError`] if a name is unknown or its id is not a number.
pub fn resolve_identity(
    user: &OwnerSpec,
    group: &OwnerSpec,
    db: &dyn IdentityDb,
) -> Result<Identity, ResolveError> {
    let uid = match user.name() {
        Some(name) => {
            let record = db
                .lookup_user(name)
                .map_err(|source| ResolveError::UnknownUser {
                    name: name.to_string(),
                    source,
                })?;
            parse_id(&record.id).ok_or_else(|| ResolveError::InvalidUid {
                name: name.to_string(),
                value: record.id.clone(),
            })?
        }
        None => user.id.unwrap_or(0),
    };

    let gid = match group.name() {
        Some(name) => {
            let record = db
                .lookup_group(name)
                .map_err(|source| ResolveError::UnknownGroup {
                    name: name.to_string(),
                    source,
                })?;
            parse_id(&record.id).ok_or_else(|| ResolveError::InvalidGid {
                name: name.to_string(),
                value: record.id.clone(),
            })?
        }
        None => group.id.unwrap_or(0),
    };

    Ok(Identity { uid, gid })
}

/// Convenience wrapper: does `path` look like a root containing identity files?
#[must_use]
pub fn has_identity_files(root: &Path) -> bool {
    root.join("etc/passwd").is_file() && root.join("etc/group").is_file()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn record(id: &str) -> IdRecord {
        IdRecord { id: id.to_string() }
    }

    // -----------------------------------------------------------------------
    // parse_id
    // -----------------------------------------------------------------------

    #[test]
    fn parse_id_accepts_conventional_notations() {
        assert_eq!(parse_id("0"), Some(0));
        assert_eq!(parse_id("1000"), Some(1000));
        assert_eq!(parse_id("+1000"), Some(1000));
        assert_eq!(parse_id("0x3e8"), Some(1000));
        assert_eq!(parse_id("0X3E8"), Some(1000));
        assert_eq!(parse_id("0o1750"), Some(1000));
        assert_eq!(parse_id("01750"), Some(1000));
        assert_eq!(parse_id("0b1111101000"), Some(1000));
        assert_eq!(parse_id("1_000"), Some(1000));
        assert_eq!(parse_id("4294967295"), Some(u32::MAX));
    }

    #[test]
    fn parse_id_rejects_garbage() {
        for raw in ["", "-1", "abc", "0x", "08", "1__0", "_1", "1_", "4294967296", "+-1", "0x-1"] {
            assert_eq!(parse_id(raw), None, "expected {raw:?} to be rejected");
        }
    }

    // -----------------------------------------------------------------------
    // resolve_identity
    // -----------------------------------------------------------------------

    #[test]
    fn empty_specs_resolve_to_root() {
        let db = MockIdentityDb::new();
        let identity =
            resolve_identity(&OwnerSpec::default(), &OwnerSpec::default(), &db).unwrap();
        assert_eq!(identity, Identity::ROOT);
    }

    #[test]
    fn explicit_ids_are_used_unchanged() {
        let db = MockIdentityDb::new();
        let identity =
            resolve_identity(&OwnerSpec::with_id(500), &OwnerSpec::with_id(501), &db).unwrap();
        assert_eq!(identity, Identity::new(500, 501));
    }

    #[test]
    fn names_resolve_through_database() {
        let mut db = MockIdentityDb::new();
        db.expect_lookup_user()
            .with(eq("core"))
            .times(1)
            .returning(|_| Ok(record("1000")));
        db.expect_lookup_group()
            .with(eq("wheel"))
            .times(1)
            .returning(|_| Ok(record("10")));
        let identity =
            resolve_identity(&OwnerSpec::named("core"), &OwnerSpec::named("wheel"), &db).unwrap();
        assert_eq!(identity, Identity::new(1000, 10));
    }

    #[test]
    fn name_takes_precedence_over_id() {
        let mut db = MockIdentityDb::new();
        db.expect_lookup_user().returning(|_| Ok(record("42")));
        let user = OwnerSpec {
            name: Some("core".to_string()),
            id: Some(7),
        };
        let identity = resolve_identity(&user, &OwnerSpec::default(), &db).unwrap();
        assert_eq!(identity, Identity::new(42, 0));
    }

    #[test]
    fn halves_default_independently() {
        let mut db = MockIdentityDb::new();
        db.expect_lookup_group().returning(|_| Ok(record("0x10")));
        let identity =
            resolve_identity(&OwnerSpec::default(), &OwnerSpec::named("staff"), &db).unwrap();
        assert_eq!(identity, Identity::new(0, 16));
    }

    #[test]
    fn unknown_user_is_an_error() {
        let mut db = MockIdentityDb::new();
        db.expect_lookup_user().returning(|name| {
            Err(LookupError::NotFound {
                database: "passwd",
                name: name.to_string(),
            })
        });
        let err = resolve_identity(&OwnerSpec::named("ghost"), &OwnerSpec::default(), &db)
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnknownUser { ref name, .. } if name == "ghost"));
    }

    #[test]
    fn unparsable_gid_fails_whole_resolution() {
        let mut db = MockIdentityDb::new();
        db.expect_lookup_user().returning(|_| Ok(record("1000")));
        db.expect_lookup_group().returning(|_| Ok(record("ten")));
        let err = resolve_identity(&OwnerSpec::named("core"), &OwnerSpec::named("core"), &db)
            .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidGid { ref value, .. } if value == "ten"));
    }

    // -----------------------------------------------------------------------
    // PasswdDb
    // -----------------------------------------------------------------------

    fn write_identity_files(root: &Path) {
        std::fs::create_dir_all(root.join("etc")).unwrap();
        std::fs::write(
            root.join("etc/passwd"),
            "# comment\nroot:x:0:0:root:/root:/bin/sh\n\ncore:x:500:500:Core:/home/core:/bin/bash\n",
        )
        .unwrap();
        std::fs::write(root.join("etc/group"), "root:x:0:\nwheel:x:10:root,core\n").unwrap();
    }

    #[test]
    fn passwd_db_reads_from_root() {
        let dir = tempfile::tempdir().unwrap();
        write_identity_files(dir.path());
        assert!(has_identity_files(dir.path()));

        let db = PasswdDb::new(dir.path());
        assert_eq!(db.lookup_user("core").unwrap().id, "500");
        assert_eq!(db.lookup_group("wheel").unwrap().id, "10");
        let identity =
            resolve_identity(&OwnerSpec::named("core"), &OwnerSpec::named("wheel"), &db).unwrap();
        assert_eq!(identity, Identity::new(500, 10));
    }

    #[test]
    fn passwd_db_reports_missing_name() {
        let dir = tempfile::tempdir().unwrap();
        write_identity_files(dir.path());
        let err = PasswdDb::new(dir.path()).lookup_user("nobody").unwrap_err();
        assert!(matches!(err, LookupError::NotFound { database: "passwd", .. }));
    }

    #[test]
    fn passwd_db_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!has_identity_files(dir.path()));
        let err = PasswdDb::new(dir.path()).lookup_group("wheel").unwrap_err();
        assert!(matches!(err, LookupError::Io { .. }));
    }

    #[test]
    fn find_id_ignores_prefix_matches() {
        let content = "corey:x:501:501::/home/corey:/bin/sh\ncore:x:500:500::/home/core:/bin/sh\n";
        assert_eq!(find_id(content, "core"), Some("500"));
        assert_eq!(find_id(content, "cor"), None);
    }
}
