//! Package descriptors: a dotfile bundle rooted at a directory holding
//! `.homedir/control.toml`.
pub mod control;
pub mod discovery;

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::PackageError;
use crate::path::PathValue;

pub use control::Control;

/// Control directory inside every package. Never merged.
pub const CONTROL_DIR: &str = ".homedir";

/// Manifest file name inside [`CONTROL_DIR`].
pub const CONTROL_FILE: &str = "control.toml";

/// The only manifest format version this engine understands.
pub const STANDARDS_VERSION: u32 = 1;

/// Version-control directories skipped while merging.
pub const IGNORE_DIRS: [&str; 4] = [".svn", "CVS", "RCS", ".git"];

/// Path of the control manifest for a package rooted at `dir`.
#[must_use]
pub fn control_path(dir: &Path) -> PathBuf {
    dir.join(CONTROL_DIR).join(CONTROL_FILE)
}

/// Returns `true` if `dir` holds a control manifest.
#[must_use]
pub fn is_package_dir(dir: &Path) -> bool {
    control_path(dir).is_file()
}

/// A validated package descriptor.
///
/// Two descriptors are equal when their locations are equal.  A descriptor
/// also compares equal to a `str` holding its name, and [`AsRef<str>`] yields
/// the name, so descriptors and names are interchangeable as catalog keys.
#[derive(Debug, Clone)]
pub struct Package {
    name: String,
    location: PathValue,
    priority: Option<String>,
    maintainer: Option<String>,
    description: Option<String>,
    standards_version: u32,
    ubuntu_packages: Vec<String>,
    dirs: Vec<String>,
    mkdirs: Vec<String>,
    depends: BTreeSet<String>,
    src_dirs: BTreeSet<PathValue>,
    src_mkdirs: BTreeSet<PathValue>,
}

impl Package {
    /// Validate `control` and build a descriptor rooted at `location`.
    ///
    /// `location` is resolved with [`PathValue::realpath`].  `dirs` and
    /// `mkdirs` are deduplicated keeping their first occurrence.
    ///
    /// # Errors
    ///
    /// - [`PackageError::InvalidName`] if the name is empty or has characters
    ///   outside `[0-9A-Za-z_-]`.
    /// - [`PackageError::VersionMismatch`] for any standards version but
    ///   [`STANDARDS_VERSION`].
    /// - [`PackageError::InvalidControl`] for an absolute `dirs` entry.
    /// - [`PackageError::MkdirNotInDirs`] if an `mkdirs` entry is not in `dirs`.
    /// - [`PackageError::Io`] if `location` cannot be resolved.
    pub fn new(location: impl AsRef<Path>, control: Control) -> Result<Self, PackageError> {
        let location_path = location.as_ref();
        if !is_valid_name(&control.package) {
            return Err(PackageError::InvalidName(control.package));
        }
        if control.standards_version != STANDARDS_VERSION {
            return Err(PackageError::VersionMismatch {
                package: control.package,
                found: control.standards_version,
                expected: STANDARDS_VERSION,
            });
        }

        let dirs = normalize_entries(&control.dirs, location_path)?;
        let mkdirs = normalize_entries(&control.mkdirs, location_path)?;
        if let Some(stray) = mkdirs.iter().find(|m| !dirs.contains(m)) {
            return Err(PackageError::MkdirNotInDirs {
                package: control.package,
                mkdir: stray.clone(),
            });
        }

        let location =
            PathValue::new(location_path)
                .realpath()
                .map_err(|source| PackageError::Io {
                    path: location_path.to_path_buf(),
                    source,
                })?;
        let src_dirs = dirs.iter().map(|d| location.join(d)).collect();
        let src_mkdirs = mkdirs.iter().map(|m| location.join(m)).collect();

        Ok(Self {
            name: control.package,
            location,
            priority: control.priority,
            maintainer: control.maintainer,
            description: control.description,
            standards_version: control.standards_version,
            ubuntu_packages: control.ubuntu_packages,
            dirs,
            mkdirs,
            depends: control.depends.into_iter().map(|d| d.trim().to_string()).collect(),
            src_dirs,
            src_mkdirs,
        })
    }

    /// Load the package rooted at `dir` from its control manifest.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::NotPackage`] if `dir` has no manifest, or any
    /// error from [`Control::load`] and [`Package::new`].
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, PackageError> {
        let dir = dir.as_ref();
        let manifest = control_path(dir);
        if !manifest.is_file() {
            return Err(PackageError::NotPackage(dir.to_path_buf()));
        }
        Self::new(dir, Control::load(&manifest)?)
    }

    /// Unique package name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute, symlink-resolved package root.
    #[must_use]
    pub const fn location(&self) -> &PathValue {
        &self.location
    }

    /// Free-form priority label.
    #[must_use]
    pub fn priority(&self) -> Option<&str> {
        self.priority.as_deref()
    }

    /// Maintainer contact.
    #[must_use]
    pub fn maintainer(&self) -> Option<&str> {
        self.maintainer.as_deref()
    }

    /// Full description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// First line of the description, or `"No Description"`.
    #[must_use]
    pub fn short_description(&self) -> &str {
        self.description
            .as_deref()
            .and_then(|d| d.lines().next())
            .filter(|line| !line.trim().is_empty())
            .unwrap_or("No Description")
    }

    /// Manifest format version.
    #[must_use]
    pub const fn standards_version(&self) -> u32 {
        self.standards_version
    }

    /// Distribution packages the package expects.
    #[must_use]
    pub fn ubuntu_packages(&self) -> &[String] {
        &self.ubuntu_packages
    }

    /// Directory-level link entries, relative to the location.
    #[must_use]
    pub fn dirs(&self) -> &[String] {
        &self.dirs
    }

    /// Entries of `dirs` materialized as real directories.
    #[must_use]
    pub fn mkdirs(&self) -> &[String] {
        &self.mkdirs
    }

    /// Raw dependency names. Resolve them with
    /// [`Catalog::depends_of`](crate::catalog::Catalog::depends_of).
    #[must_use]
    pub const fn depends_names(&self) -> &BTreeSet<String> {
        &self.depends
    }

    /// `location + d` for every `d` in `dirs`.
    #[must_use]
    pub const fn src_dirs(&self) -> &BTreeSet<PathValue> {
        &self.src_dirs
    }

    /// `location + m` for every `m` in `mkdirs`.
    #[must_use]
    pub const fn src_mkdirs(&self) -> &BTreeSet<PathValue> {
        &self.src_mkdirs
    }

    /// Path of a hook script (`pre-install`, `post-remove`, ...).
    #[must_use]
    pub fn hook_path(&self, hook: &str) -> PathValue {
        self.location.join(CONTROL_DIR).join(hook)
    }

    /// Returns `true` if `path` lies strictly inside the package location.
    #[must_use]
    pub fn is_within_location(&self, path: &PathValue) -> bool {
        path.is_subdir_of(&self.location).unwrap_or(false)
    }
}

/// `[0-9A-Za-z_-]+`
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Normalize `dirs`/`mkdirs` entries and drop duplicates, keeping order.
fn normalize_entries(entries: &[String], location: &Path) -> Result<Vec<String>, PackageError> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for entry in entries {
        let normalized = PathValue::new(entry.trim());
        if normalized.is_absolute() {
            return Err(PackageError::InvalidControl {
                path: control_path(location),
                message: format!("dirs entries must be relative: {entry}"),
            });
        }
        let normalized = normalized.to_string();
        if seen.insert(normalized.clone()) {
            out.push(normalized);
        }
    }
    Ok(out)
}

impl PartialEq for Package {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location
    }
}

impl Eq for Package {}

impl PartialEq<str> for Package {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}

impl PartialEq<&str> for Package {
    fn eq(&self, other: &&str) -> bool {
        self.name == *other
    }
}

impl AsRef<str> for Package {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn control_with_dirs(name: &str, dirs: &[&str], mkdirs: &[&str]) -> Control {
        Control {
            dirs: dirs.iter().map(ToString::to_string).collect(),
            mkdirs: mkdirs.iter().map(ToString::to_string).collect(),
            ..Control::named(name)
        }
    }

    #[test]
    fn new_computes_src_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg = Package::new(
            tmp.path(),
            control_with_dirs("emacs", &[".emacs.d", ".emacs.d/lisp/"], &[".emacs.d"]),
        )
        .unwrap();
        let location = PathValue::new(tmp.path()).realpath().unwrap();
        assert_eq!(pkg.location(), &location);
        assert!(pkg.src_dirs().contains(&location.join(".emacs.d")));
        assert!(pkg.src_dirs().contains(&location.join(".emacs.d/lisp")));
        assert_eq!(pkg.src_mkdirs().len(), 1);
        assert!(pkg.src_mkdirs().contains(&location.join(".emacs.d")));
    }

    #[test]
    fn dirs_are_deduplicated_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg = Package::new(
            tmp.path(),
            control_with_dirs("x", &["b", "a", "b/", "./a"], &[]),
        )
        .unwrap();
        assert_eq!(pkg.dirs(), ["b", "a"]);
    }

    #[test]
    fn mkdir_must_be_in_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Package::new(tmp.path(), control_with_dirs("x", &["a"], &["b"])).unwrap_err();
        assert!(matches!(err, PackageError::MkdirNotInDirs { ref mkdir, .. } if mkdir == "b"));
    }

    #[test]
    fn absolute_dir_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Package::new(tmp.path(), control_with_dirs("x", &["/etc"], &[])).unwrap_err();
        assert!(matches!(err, PackageError::InvalidControl { .. }));
    }

    #[test]
    fn invalid_names_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["", "has space", "dots.are.bad", "slash/name"] {
            assert!(
                matches!(
                    Package::new(tmp.path(), Control::named(name)),
                    Err(PackageError::InvalidName(_))
                ),
                "{name:?} should be rejected"
            );
        }
        assert!(Package::new(tmp.path(), Control::named("Emacs_base-2")).is_ok());
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let control = Control {
            standards_version: 2,
            ..Control::named("x")
        };
        assert!(matches!(
            Package::new(tmp.path(), control),
            Err(PackageError::VersionMismatch {
                found: 2,
                expected: 1,
                ..
            })
        ));
    }

    #[test]
    fn short_description_uses_first_line() {
        let tmp = tempfile::tempdir().unwrap();
        let control = Control {
            description: Some("First line\nSecond line".to_string()),
            ..Control::named("x")
        };
        let pkg = Package::new(tmp.path(), control).unwrap();
        assert_eq!(pkg.short_description(), "First line");

        let bare = Package::new(tmp.path(), Control::named("y")).unwrap();
        assert_eq!(bare.short_description(), "No Description");
    }

    #[test]
    fn equality_by_location_and_name() {
        let tmp = tempfile::tempdir().unwrap();
        let a = Package::new(tmp.path(), Control::named("a")).unwrap();
        let renamed = Package::new(tmp.path(), Control::named("b")).unwrap();
        assert_eq!(a, renamed, "same location means same package");
        assert!(a == *"a");
        assert!(a == "a");
        assert_eq!(AsRef::<str>::as_ref(&a), "a");
    }

    #[test]
    fn load_without_manifest_is_not_package() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            Package::load(tmp.path()),
            Err(PackageError::NotPackage(_))
        ));
    }

    #[test]
    fn load_reads_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join(CONTROL_DIR)).unwrap();
        std::fs::write(
            control_path(tmp.path()),
            "package = \"zsh\"\ndepends = [\"shell-base\"]\n",
        )
        .unwrap();
        let pkg = Package::load(tmp.path()).unwrap();
        assert_eq!(pkg.name(), "zsh");
        assert!(pkg.depends_names().contains("shell-base"));
        assert!(is_package_dir(tmp.path()));
    }

    #[test]
    fn within_location_is_strict() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg = Package::new(tmp.path(), Control::named("a")).unwrap();
        assert!(pkg.is_within_location(&pkg.location().join(".bashrc")));
        assert!(!pkg.is_within_location(pkg.location()));
        assert!(!pkg.is_within_location(&pkg.location().dirname()));
    }
}
