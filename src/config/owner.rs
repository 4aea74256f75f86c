//! Owner specification shared by file and link entries.
use serde::Deserialize;

/// A user or group owner as written in the manifest.
///
/// Either half may be given by `name` (looked up in the destination root's
/// identity database) or by numeric `id`.  When both are present the name
/// wins; when neither is present the owner defaults to `0`.
///
/// # Examples
///
/// ```
/// use bootfiles_cli::config::owner::OwnerSpec;
///
/// let by_name = OwnerSpec::named("core");
/// let by_id = OwnerSpec::with_id(500);
/// assert!(OwnerSpec::default().is_unset());
/// assert!(!by_name.is_unset());
/// assert_eq!(by_id.id, Some(500));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OwnerSpec {
    /// Symbolic user or group name.
    #[serde(default)]
    pub name: Option<String>,
    /// Explicit numeric id.
    #[serde(default)]
    pub id: Option<u32>,
}

impl OwnerSpec {
    /// Owner given by symbolic name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            id: None,
        }
    }

    /// Owner given by numeric id.
    #[must_use]
    pub const fn with_id(id: u32) -> Self {
        Self {
            name: None,
            id: Some(id),
        }
    }

    /// The symbolic name, treating an empty string as absent.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Returns `true` when neither a name nor an id was given.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.name().is_none() && self.id.is_none()
    }
}
