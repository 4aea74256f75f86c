//! File-system resource helpers.
use std::io;
use std::os::unix::fs::DirBuilderExt as _;
use std::path::{Component, Path, PathBuf};

/// Mode of directories created for missing ancestors.
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) with [`DEFAULT_DIR_MODE`] if necessary.
///
/// Shared by the file and link materializers.  Existing directories are
/// left as they are.
///
/// # Errors
///
/// Returns an error if a directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::DirBuilder::new()
            .recursive(true)
            .mode(DEFAULT_DIR_MODE)
            .create(parent),
        _ => Ok(()),
    }
}

/// Lexically clean a manifest path into a path relative to the root.
///
/// `.` is dropped and `..` never climbs above the root.  An empty result
/// means `path` names the root itself.
///
/// # Examples
///
/// ```
/// use bootfiles_cli::resources::helpers::fs::clean_relative;
/// use std::path::Path;
///
/// assert_eq!(clean_relative("/../etc/./motd"), Path::new("etc/motd"));
/// assert!(clean_relative("/etc/..").as_os_str().is_empty());
/// ```
#[must_use]
pub fn clean_relative(path: impl AsRef<Path>) -> PathBuf {
    let mut relative = PathBuf::new();
    for component in path.as_ref().components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::ParentDir => {
                relative.pop();
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    relative
}

/// Join a manifest path under the destination `root`.
///
/// `path` is cleaned with [`clean_relative`], so the result always lies
/// inside `root`.
///
/// # Examples
///
/// ```
/// use bootfiles_cli::resources::helpers::fs::join_root;
/// use std::path::Path;
///
/// let root = Path::new("/sysroot");
/// assert_eq!(join_root(root, "/etc/hostname"), Path::new("/sysroot/etc/hostname"));
/// assert_eq!(join_root(root, "/../etc/./motd"), Path::new("/sysroot/etc/motd"));
/// ```
#[must_use]
pub fn join_root(root: &Path, path: impl AsRef<Path>) -> PathBuf {
    root.join(clean_relative(path))
}
