//! Normalized filesystem paths with exact relative-path arithmetic.
//!
//! [`PathValue`] wraps a [`PathBuf`] that has been lexically cleaned (no `.`
//! components, no duplicate or trailing separators) and case-folded where the
//! platform is case-insensitive.  The arithmetic methods
//! ([`relative_path_from`](PathValue::relative_path_from),
//! [`is_subdir_of`](PathValue::is_subdir_of), [`join`](PathValue::join)) never
//! touch the filesystem; the remaining methods are thin wrappers over
//! [`std::fs`] that return [`std::io::Result`].
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::PathError;

/// Symlink hops followed by [`PathValue::realpath`] before giving up on a loop.
const MAX_LINK_DEPTH: usize = 40;

/// An immutable, normalized filesystem path.
///
/// # Examples
///
/// ```
/// use homedir::path::PathValue;
///
/// let file = PathValue::new("/a/b/./c/d/e/f");
/// let base = PathValue::new("/a/b/q/./r");
/// assert_eq!(file.relative_path_from(&base).unwrap(), "../../c/d/e/f");
/// assert!(file.is_subdir_of(&PathValue::new("/a/b")).unwrap());
/// assert!(!PathValue::new("/a/bc").is_subdir_of(&PathValue::new("/a/b")).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathValue(PathBuf);

impl PathValue {
    /// Create a normalized path.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self(normalize(path.as_ref()))
    }

    /// Join `parts` in order and normalize the result.
    ///
    /// An absolute part discards everything before it, as with [`PathBuf::push`].
    #[must_use]
    pub fn from_parts<I, P>(parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut buf = PathBuf::new();
        for part in parts {
            buf.push(part);
        }
        Self::new(buf)
    }

    /// Borrow the underlying path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Copy out the underlying path.
    #[must_use]
    pub fn to_path_buf(&self) -> PathBuf {
        self.0.clone()
    }

    /// Returns `true` for paths anchored at a filesystem root.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.0.has_root()
    }

    /// The final component, or an empty path when there is none.
    #[must_use]
    pub fn basename(&self) -> Self {
        self.0
            .file_name()
            .map_or_else(|| Self(PathBuf::new()), |name| Self::new(name))
    }

    /// Everything but the final component.  The root is its own dirname.
    #[must_use]
    pub fn dirname(&self) -> Self {
        self.0
            .parent()
            .map_or_else(|| self.clone(), |parent| Self::new(parent))
    }

    /// Append `other`, returning a new value.
    #[must_use]
    pub fn join(&self, other: impl AsRef<Path>) -> Self {
        Self::new(self.0.join(other))
    }

    /// Compute the shortest relative path that leads from `base` to `self`.
    ///
    /// Purely lexical: resolve symlinks first if they matter.
    ///
    /// # Errors
    ///
    /// - [`PathError::MixedAbsoluteRelative`] if exactly one operand is absolute.
    /// - [`PathError::DifferentPrefix`] if the operands have different roots.
    /// - [`PathError::ParentInBase`] if `base` keeps a `..` component once the
    ///   common prefix is removed.
    pub fn relative_path_from(&self, base: &Self) -> Result<Self, PathError> {
        if self.is_absolute() != base.is_absolute() {
            return Err(PathError::MixedAbsoluteRelative {
                path: self.to_string(),
                base: base.to_string(),
            });
        }

        let (self_prefix, self_names) = self.decompose();
        let (base_prefix, base_names) = base.decompose();
        if self_prefix != base_prefix {
            return Err(PathError::DifferentPrefix {
                path: self.to_string(),
                base: base.to_string(),
            });
        }

        let common = self_names
            .iter()
            .zip(&base_names)
            .take_while(|(a, b)| a == b)
            .count();

        let base_rest: Vec<&OsStr> = base_names.into_iter().skip(common).collect();
        if base_rest.iter().any(|name| *name == OsStr::new("..")) {
            return Err(PathError::ParentInBase(base.to_string()));
        }

        let mut relative = PathBuf::new();
        for _ in &base_rest {
            relative.push("..");
        }
        for name in self_names.into_iter().skip(common) {
            relative.push(name);
        }
        if relative.as_os_str().is_empty() {
            relative.push(".");
        }
        Ok(Self::new(relative))
    }

    /// Returns `true` if `self` lies strictly below `other`.
    ///
    /// Matching is done on whole components, so `/a/bc` is not below `/a/b`,
    /// and a path is never a subdirectory of itself.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::MixedAbsoluteRelative`] if exactly one operand is
    /// absolute.
    pub fn is_subdir_of(&self, other: &Self) -> Result<bool, PathError> {
        if self.is_absolute() != other.is_absolute() {
            return Err(PathError::MixedAbsoluteRelative {
                path: self.to_string(),
                base: other.to_string(),
            });
        }

        let (self_prefix, self_names) = self.decompose();
        let (other_prefix, other_names) = other.decompose();
        if self_prefix != other_prefix {
            return Ok(false);
        }
        Ok(self_names.len() > other_names.len() && self_names.starts_with(&other_names))
    }

    /// Split into the root prefix (empty for relative paths) and the list of
    /// names, with `.` removed and `..` kept.
    fn decompose(&self) -> (OsString, Vec<&OsStr>) {
        let mut prefix = OsString::new();
        let mut names = Vec::new();
        for component in self.0.components() {
            match component {
                Component::Prefix(_) | Component::RootDir => prefix.push(component.as_os_str()),
                Component::CurDir => {}
                Component::ParentDir | Component::Normal(_) => names.push(component.as_os_str()),
            }
        }
        (prefix, names)
    }

    // -----------------------------------------------------------------------
    // Filesystem primitives
    // -----------------------------------------------------------------------

    /// Returns `true` if the path exists, following symlinks.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.0.exists()
    }

    /// Returns `true` if anything is at the path, including a dangling symlink.
    #[must_use]
    pub fn lexists(&self) -> bool {
        self.0.symlink_metadata().is_ok()
    }

    /// Returns `true` for regular files (following symlinks).
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.0.is_file()
    }

    /// Returns `true` for directories (following symlinks).
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.0.is_dir()
    }

    /// Returns `true` if the path itself is a symlink, dangling or not.
    #[must_use]
    pub fn is_link(&self) -> bool {
        self.0
            .symlink_metadata()
            .is_ok_and(|meta| meta.file_type().is_symlink())
    }

    /// Returns `true` for regular files the current user may execute.
    #[must_use]
    pub fn is_executable(&self) -> bool {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::metadata(&self.0)
                .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        }
        #[cfg(not(unix))]
        {
            self.0.is_file()
        }
    }

    /// Resolve every symlink and return an absolute canonical path.
    ///
    /// Unlike [`std::fs::canonicalize`] this succeeds for dangling links and
    /// missing tails: it resolves as far as the filesystem allows and appends
    /// the rest unchanged.  Symlink loops stop after a fixed number of hops.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory is needed and unavailable, or
    /// if an existing symlink cannot be read.
    pub fn realpath(&self) -> io::Result<Self> {
        let absolute = if self.is_absolute() {
            self.0.clone()
        } else {
            std::env::current_dir()?.join(&self.0)
        };
        if let Ok(real) = dunce::canonicalize(&absolute) {
            return Ok(Self::new(real));
        }
        let resolved = resolve_into(PathBuf::new(), &absolute, 0)?;
        Ok(Self::new(dunce::simplified(&resolved)))
    }

    /// List the names inside this directory, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn list_dir(&self) -> io::Result<Vec<OsString>> {
        let mut names = std::fs::read_dir(&self.0)?
            .map(|entry| entry.map(|e| e.file_name()))
            .collect::<io::Result<Vec<_>>>()?;
        names.sort();
        Ok(names)
    }

    /// Create this directory (the parent must exist).
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn mkdir(&self) -> io::Result<()> {
        std::fs::create_dir(&self.0)
    }

    /// Remove this directory, which must be empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be removed.
    pub fn rmdir(&self) -> io::Result<()> {
        std::fs::remove_dir(&self.0)
    }

    /// Remove the file or symlink at this path (never a real directory).
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is there or it cannot be removed.
    pub fn unlink(&self) -> io::Result<()> {
        let meta = std::fs::symlink_metadata(&self.0)?;
        if is_dir_like(&meta) {
            std::fs::remove_dir(&self.0)
        } else {
            std::fs::remove_file(&self.0)
        }
    }

    /// Read the content of the symlink at this path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a symlink.
    pub fn read_link(&self) -> io::Result<Self> {
        std::fs::read_link(&self.0).map(Self::new)
    }

    /// Create a symlink at `link` whose content is this path, verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error if `link` already exists or cannot be created.
    pub fn symlink_to(&self, link: &Self) -> io::Result<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(&self.0, &link.0)
        }

        #[cfg(windows)]
        {
            let resolved = link.dirname().0.join(&self.0);
            if resolved.is_dir() {
                std::os::windows::fs::symlink_dir(&self.0, &link.0)
            } else {
                std::os::windows::fs::symlink_file(&self.0, &link.0)
            }
        }
    }

    /// Rename this path to `to`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rename fails.
    pub fn rename(&self, to: &Self) -> io::Result<()> {
        std::fs::rename(&self.0, &to.0)
    }
}

/// Walk `rest` component by component on top of `resolved`, replacing every
/// symlink with its (recursively resolved) target.  Missing components are
/// appended as they are.
fn resolve_into(mut resolved: PathBuf, rest: &Path, depth: usize) -> io::Result<PathBuf> {
    for component in rest.components() {
        match component {
            Component::Prefix(prefix) => resolved = PathBuf::from(prefix.as_os_str()),
            Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => {
                let candidate = resolved.join(name);
                match std::fs::symlink_metadata(&candidate) {
                    Ok(meta) if meta.file_type().is_symlink() && depth < MAX_LINK_DEPTH => {
                        let target = std::fs::read_link(&candidate)?;
                        resolved = resolve_into(resolved, &target, depth + 1)?;
                    }
                    _ => resolved = candidate,
                }
            }
        }
    }
    Ok(resolved)
}

/// Lexically clean `path` and fold case where the platform ignores it.
fn normalize(path: &Path) -> PathBuf {
    let mut cleaned: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if cleaned.as_os_str().is_empty() && !path.as_os_str().is_empty() {
        cleaned.push(".");
    }
    fold_case(cleaned)
}

#[cfg(windows)]
fn fold_case(path: PathBuf) -> PathBuf {
    PathBuf::from(path.to_string_lossy().to_lowercase())
}

#[cfg(not(windows))]
const fn fold_case(path: PathBuf) -> PathBuf {
    path
}

/// On Windows, `symlink_metadata().is_dir()` is `false` for directory
/// symlinks, so the raw `FILE_ATTRIBUTE_DIRECTORY` bit is checked instead.
fn is_dir_like(meta: &std::fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        meta.file_attributes() & 0x10 != 0
    }
    #[cfg(not(windows))]
    {
        meta.is_dir()
    }
}

impl fmt::Display for PathValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl AsRef<Path> for PathValue {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl From<PathBuf> for PathValue {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&Path> for PathValue {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

impl From<&str> for PathValue {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl PartialEq<str> for PathValue {
    fn eq(&self, other: &str) -> bool {
        *self == Self::new(other)
    }
}

impl PartialEq<&str> for PathValue {
    fn eq(&self, other: &&str) -> bool {
        *self == Self::new(other)
    }
}
