//! The `.homedir/control.toml` package manifest.
//!
//! ```toml
//! package = "emacs-base"
//! priority = "optional"
//! maintainer = "Jane Doe <jane@example.com>"
//! standards-version = 1
//! description = """
//! Base emacs setup
//! Longer text follows the first line."""
//! depends = ["shell-base"]
//! dirs = [".emacs.d", ".emacs.d/lisp"]
//! mkdirs = [".emacs.d"]
//! ubuntu-packages = ["emacs-nox"]
//! ```
use std::path::Path;

use serde::Deserialize;

use super::STANDARDS_VERSION;
use crate::error::PackageError;

/// Raw contents of a control manifest, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Control {
    /// Package name.
    pub package: String,
    /// Free-form priority label.
    #[serde(default)]
    pub priority: Option<String>,
    /// Maintainer contact.
    #[serde(default)]
    pub maintainer: Option<String>,
    /// Names of packages this one depends on.
    #[serde(default)]
    pub depends: Vec<String>,
    /// Manifest format version.
    #[serde(default = "default_standards_version")]
    pub standards_version: u32,
    /// Multi-line description; the first line is the summary.
    #[serde(default)]
    pub description: Option<String>,
    /// Subdirectories eligible for directory-level linking.
    #[serde(default)]
    pub dirs: Vec<String>,
    /// Subset of `dirs` materialized as real directories.
    #[serde(default)]
    pub mkdirs: Vec<String>,
    /// Distribution packages the package expects to be installed.
    #[serde(default)]
    pub ubuntu_packages: Vec<String>,
}

const fn default_standards_version() -> u32 {
    STANDARDS_VERSION
}

impl Control {
    /// A minimal manifest with only a name.
    #[must_use]
    pub fn named(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            priority: None,
            maintainer: None,
            depends: Vec::new(),
            standards_version: STANDARDS_VERSION,
            description: None,
            dirs: Vec::new(),
            mkdirs: Vec::new(),
            ubuntu_packages: Vec::new(),
        }
    }

    /// Parse manifest text; `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::InvalidControl`] for malformed TOML, a missing
    /// `package` key, or any unknown key.
    pub fn parse(text: &str, path: &Path) -> Result<Self, PackageError> {
        toml::from_str(text).map_err(|e| PackageError::InvalidControl {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    /// Read and parse the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::Io`] if the file cannot be read, or any error
    /// from [`parse`](Self::parse).
    pub fn load(path: &Path) -> Result<Self, PackageError> {
        let text = std::fs::read_to_string(path).map_err(|source| PackageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }
}
