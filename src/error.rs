//! Domain-specific error types for the homedir engine.
//!
//! Library modules return these typed errors; the merge and prune engines and
//! the command handlers wrap them in [`anyhow::Error`] with context via `?`.
//! Every variant survives the wrapping and can be recovered with
//! [`anyhow::Error::downcast_ref`].
//!
//! # Error taxonomy
//!
//! ```text
//! PathError    : relative-path / containment arithmetic
//! PackageError : loading and validating a package descriptor
//! ConflictError: an ownership clash no policy resolved
//! CatalogError : unknown or duplicate package names
//! MergeError   : internal invariant violations while merging
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors from pure path arithmetic on [`PathValue`](crate::path::PathValue).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// One operand is absolute and the other relative.
    #[error("'{path}' and '{base}' must both be relative or both be absolute")]
    MixedAbsoluteRelative {
        /// The path the operation was called on.
        path: String,
        /// The other operand.
        base: String,
    },

    /// The operands live under different roots (e.g. two Windows drives).
    #[error("different prefix: '{path}' and '{base}'")]
    DifferentPrefix {
        /// The path the operation was called on.
        path: String,
        /// The other operand.
        base: String,
    },

    /// The base still contains `..` after the common prefix is removed, so no
    /// relative path can be expressed safely.
    #[error("base includes .. in path: '{0}'")]
    ParentInBase(String),
}

/// Errors raised while loading or validating a package descriptor.
#[derive(Error, Debug)]
pub enum PackageError {
    /// The directory has no control manifest.
    #[error("not a package: {0}")]
    NotPackage(PathBuf),

    /// The package name contains characters outside `[0-9A-Za-z_-]`.
    #[error("invalid package name '{0}': only letters, digits, '_' and '-' are allowed")]
    InvalidName(String),

    /// The control manifest declares an unsupported standards version.
    #[error("package '{package}' has standards-version {found}, expected {expected}")]
    VersionMismatch {
        /// Name of the rejected package.
        package: String,
        /// Version found in the manifest.
        found: u32,
        /// Version this engine supports.
        expected: u32,
    },

    /// An `mkdirs` entry is not also listed in `dirs`.
    #[error("invalid mkdir '{mkdir}' in package '{package}': it isn't marked as a dir")]
    MkdirNotInDirs {
        /// Name of the rejected package.
        package: String,
        /// The offending `mkdirs` entry.
        mkdir: String,
    },

    /// The control manifest is malformed or contains an unknown key.
    #[error("invalid control file {path}: {message}")]
    InvalidControl {
        /// Path of the manifest.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// An I/O error occurred while reading package metadata.
    #[error("IO error reading {path}: {source}")]
    Io {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// An unresolved ownership clash during a merge.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("The file {} prevents linking {}", .dest.display(), .src.display())]
pub struct ConflictError {
    /// The package source that could not be linked.
    pub src: PathBuf,
    /// The destination entry that is in the way.
    pub dest: PathBuf,
}

/// Errors raised by catalog lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// One or more names are not registered. All unresolved names are listed.
    #[error("unknown package(s): {}", .0.join(", "))]
    MissingPackage(Vec<String>),

    /// Two packages with the same name were registered.
    #[error("duplicate package '{name}' at {first} and {second}")]
    DuplicatePackage {
        /// The clashing name.
        name: String,
        /// Location of the package registered first.
        first: String,
        /// Location of the rejected package.
        second: String,
    },
}

/// Internal invariant violations detected by the merge engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// The destination is in a shape the engine does not know how to handle.
    #[error("unexpected state at {path}: {reason}")]
    UnexpectedState {
        /// The destination path.
        path: PathBuf,
        /// Human-readable explanation.
        reason: String,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    // -----------------------------------------------------------------------
    // PathError
    // -----------------------------------------------------------------------

    #[test]
    fn path_error_mixed_display() {
        let e = PathError::MixedAbsoluteRelative {
            path: "/a".to_string(),
            base: "b".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "'/a' and 'b' must both be relative or both be absolute"
        );
    }

    #[test]
    fn path_error_parent_in_base_display() {
        let e = PathError::ParentInBase("../x".to_string());
        assert_eq!(e.to_string(), "base includes .. in path: '../x'");
    }

    // -----------------------------------------------------------------------
    // PackageError
    // -----------------------------------------------------------------------

    #[test]
    fn package_error_version_mismatch_display() {
        let e = PackageError::VersionMismatch {
            package: "emacs".to_string(),
            found: 2,
            expected: 1,
        };
        assert_eq!(
            e.to_string(),
            "package 'emacs' has standards-version 2, expected 1"
        );
    }

    #[test]
    fn package_error_mkdir_display() {
        let e = PackageError::MkdirNotInDirs {
            package: "emacs".to_string(),
            mkdir: ".emacs.d".to_string(),
        };
        assert!(e.to_string().contains(".emacs.d"));
        assert!(e.to_string().contains("isn't marked as a dir"));
    }

    #[test]
    fn package_error_io_has_source() {
        use std::error::Error as StdError;
        let e = PackageError::Io {
            path: PathBuf::from("/pkgs/a/.homedir/control.toml"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("control.toml"));
    }

    // -----------------------------------------------------------------------
    // ConflictError / CatalogError
    // -----------------------------------------------------------------------

    #[test]
    fn conflict_error_display() {
        let e = ConflictError {
            src: PathBuf::from("/pkgs/a/.bashrc"),
            dest: PathBuf::from("/home/u/.bashrc"),
        };
        assert_eq!(
            e.to_string(),
            "The file /home/u/.bashrc prevents linking /pkgs/a/.bashrc"
        );
    }

    #[test]
    fn missing_package_lists_every_name() {
        let e = CatalogError::MissingPackage(vec!["vim".to_string(), "zsh".to_string()]);
        assert_eq!(e.to_string(), "unknown package(s): vim, zsh");
    }

    #[test]
    fn conflict_error_survives_anyhow_context() {
        use anyhow::Context as _;
        let e = ConflictError {
            src: PathBuf::from("/s"),
            dest: PathBuf::from("/d"),
        };
        let wrapped: anyhow::Result<()> = Err(e.clone()).context("merging package 'a'");
        let err = wrapped.expect_err("should be an error");
        assert_eq!(err.downcast_ref::<ConflictError>(), Some(&e));
    }

    // -----------------------------------------------------------------------
    // Send + Sync bounds
    // -----------------------------------------------------------------------

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<PathError>();
        assert_send_sync::<PackageError>();
        assert_send_sync::<ConflictError>();
        assert_send_sync::<CatalogError>();
        assert_send_sync::<MergeError>();
    }
}
