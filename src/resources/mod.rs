//! Single filesystem effects the engines are built from.
//!
//! A [`symlink::RelativeSymlink`] is one link in the destination tree and a
//! [`hook::HookScript`] is one of a package's install or remove scripts.
//! Each reports what it did as a [`ResourceChange`], so callers can log
//! without re-inspecting the disk.
pub mod hook;
pub mod symlink;

use anyhow::Result;

/// Something that can be described and put in place.
pub trait Applicable {
    /// Short human-readable form used in log lines.
    fn description(&self) -> String;

    /// Put the resource in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the filesystem refuses the change or the
    /// resource is obstructed.
    fn apply(&self) -> Result<ResourceChange>;

    /// Undo a previous [`apply`](Self::apply).
    ///
    /// # Errors
    ///
    /// The default refuses; hooks have no inverse.
    fn remove(&self) -> Result<ResourceChange> {
        anyhow::bail!("{} cannot be removed", self.description())
    }
}

/// What a resource finds on disk before it acts.
///
/// # Examples
///
/// ```
/// use homedir::resources::ResourceState;
///
/// let stale = ResourceState::Incorrect { current: "../old/.vimrc".into() };
/// assert_ne!(stale, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Nothing at the path.
    Missing,
    /// Already as wanted.
    Correct,
    /// Ours to fix, e.g. a link with the wrong target.
    Incorrect {
        /// What is there now.
        current: String,
    },
    /// Something that must not be touched, e.g. a real file.
    Invalid {
        /// Why it cannot be replaced.
        reason: String,
    },
}

/// Outcome of [`Applicable::apply`] or [`Applicable::remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// The disk changed.
    Applied,
    /// Nothing to do.
    AlreadyCorrect,
    /// Deliberately not acted on.
    Skipped {
        /// Why.
        reason: String,
    },
}

/// Resources that can inspect their own state.
pub trait Resource: Applicable {
    /// Look at the disk without changing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be inspected.
    fn current_state(&self) -> Result<ResourceState>;
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::hook::{Hook, HookScript};
    use super::symlink::RelativeSymlink;
    use super::*;
    use crate::logging::MemoryLog;
    use crate::package::{CONTROL_DIR, Control, Package};
    use crate::path::PathValue;

    fn package(dir: &PathValue, name: &str) -> Package {
        std::fs::create_dir_all(dir.join(CONTROL_DIR).as_path()).unwrap();
        Package::new(dir.as_path(), Control::named(name)).unwrap()
    }

    #[test]
    fn resources_work_as_trait_objects() {
        let tmp = tempfile::tempdir().unwrap();
        let root = PathValue::new(tmp.path());
        let pkg_dir = root.join("vim");
        let package = package(&pkg_dir, "vim");
        std::fs::write(pkg_dir.join(".vimrc").as_path(), "").unwrap();
        let log = MemoryLog::new();

        let link = RelativeSymlink::new(pkg_dir.join(".vimrc"), root.join(".vimrc"));
        let hook = HookScript::new(&package, Hook::PreInstall, &log);
        let resources: [&dyn Applicable; 2] = [&link, &hook];

        let changes: Vec<_> = resources.iter().map(|r| r.apply().unwrap()).collect();

        assert_eq!(changes[0], ResourceChange::Applied);
        assert!(matches!(changes[1], ResourceChange::Skipped { .. }));
    }

    #[test]
    fn hooks_cannot_be_removed() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg_dir = PathValue::new(tmp.path()).join("zsh");
        let package = package(&pkg_dir, "zsh");
        let log = MemoryLog::new();

        let err = HookScript::new(&package, Hook::PostRemove, &log)
            .remove()
            .unwrap_err();

        assert!(err.to_string().contains("cannot be removed"), "{err}");
    }
}
