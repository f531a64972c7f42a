//! Remove a package from a destination tree.
use std::collections::BTreeSet;
use std::fmt;

use anyhow::{Context as _, Result};

use crate::logging::Log;
use crate::package::Package;
use crate::path::PathValue;
use crate::resources::hook::{Hook, HookScript};
use crate::resources::symlink::RelativeSymlink;
use crate::resources::{Applicable, ResourceChange};

/// Deletes the links that resolve into a package and the directories that
/// become empty as a result.
///
/// Only the destination root and the package's `dirs` below it are
/// descended into.  Links owned by other packages and anything that is not a
/// link are left in place.
pub struct PruneEngine<'a> {
    log: &'a dyn Log,
}

impl<'a> PruneEngine<'a> {
    /// Create an engine reporting to `log`.
    #[must_use]
    pub const fn new(log: &'a dyn Log) -> Self {
        Self { log }
    }

    /// Run the remove hooks around unmerging `package` from `dest_root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be read or a link cannot
    /// be deleted.
    pub fn remove(&self, package: &Package, dest_root: &PathValue) -> Result<()> {
        self.run_hook(package, Hook::PreRemove)?;
        self.unmerge(package, dest_root)
            .with_context(|| format!("removing {} from {dest_root}", package.name()))?;
        self.run_hook(package, Hook::PostRemove)
    }

    /// Delete every link under `dest_root` that resolves into `package`.
    ///
    /// Returns `true` if `dest_root` was left empty.  The root itself is
    /// never removed.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be listed or a link cannot be
    /// deleted.
    pub fn unmerge(&self, package: &Package, dest_root: &PathValue) -> Result<bool> {
        let root = dest_root
            .realpath()
            .with_context(|| format!("resolving {dest_root}"))?;
        let scope: BTreeSet<PathValue> = std::iter::once(root.clone())
            .chain(package.dirs().iter().map(|dir| root.join(dir)))
            .collect();
        self.unmerge_in(package, &root, &scope, true)
    }

    fn unmerge_in(
        &self,
        package: &Package,
        dest: &PathValue,
        scope: &BTreeSet<PathValue>,
        outermost: bool,
    ) -> Result<bool> {
        let dest = dest
            .realpath()
            .with_context(|| format!("resolving {dest}"))?;
        if !scope.contains(&dest) || dest == *package.location() {
            return Ok(false);
        }

        let mut empty = true;
        for name in dest
            .list_dir()
            .with_context(|| format!("listing {dest}"))?
        {
            let path = dest.join(&name);
            if path.is_link() {
                let target = path
                    .realpath()
                    .with_context(|| format!("resolving {path}"))?;
                if package.is_within_location(&target) {
                    let link = RelativeSymlink::new(target, path);
                    link.remove()?;
                    self.log.debug(&format!("unlinked {}", link.link));
                } else {
                    empty = false;
                }
            } else if path.is_dir() {
                let emptied = self.unmerge_in(package, &path, scope, false)?;
                empty = empty && emptied;
            } else {
                empty = false;
            }
        }

        if !empty || outermost {
            return Ok(empty);
        }
        match dest.rmdir() {
            Ok(()) => {
                self.log.debug(&format!("removed directory {dest}"));
                Ok(true)
            }
            Err(e) => {
                self.log
                    .error(&format!("unable to remove directory {dest}: {e}"));
                Ok(false)
            }
        }
    }

    fn run_hook(&self, package: &Package, hook: Hook) -> Result<()> {
        let script = HookScript::new(package, hook, self.log);
        if let ResourceChange::Skipped { reason } = script.apply()? {
            self.log
                .debug(&format!("{} skipped: {reason}", script.description()));
        }
        Ok(())
    }
}

impl fmt::Debug for PruneEngine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PruneEngine").finish_non_exhaustive()
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;

    use super::*;
    use crate::catalog::Catalog;
    use crate::engine::MergeEngine;
    use crate::engine::test_helpers::Fixture;
    use crate::logging::MemoryLog;

    #[test]
    fn remove_after_install_restores_empty_home() {
        let fx = Fixture::new();
        let pkg = fx.package(
            "dev",
            "dirs = [\"bin\", \".config\", \".config/dev\"]\nmkdirs = [\".config\", \".config/dev\"]\n",
            &["bin/tool", ".config/dev/settings.toml", ".profile"],
        );
        let log = MemoryLog::new();

        MergeEngine::new(&log).install(&pkg, &fx.home).unwrap();
        assert_ne!(fx.tree(), "");
        PruneEngine::new(&log).remove(&pkg, &fx.home).unwrap();

        assert_eq!(fx.tree(), "");
        assert!(fx.home.is_dir(), "destination root must survive");
        assert!(log.errors().is_empty());
    }

    #[test]
    fn foreign_entries_are_kept() {
        let fx = Fixture::new();
        let pkg = fx.package(
            "dev",
            "dirs = [\".config\"]\nmkdirs = [\".config\"]\n",
            &[".config/dev.toml", ".profile"],
        );
        let log = MemoryLog::new();
        MergeEngine::new(&log).install(&pkg, &fx.home).unwrap();
        fs::write(fx.home.join(".config/user.toml"), "mine").unwrap();
        fs::write(fx.home.join(".bashrc"), "mine").unwrap();
        PathValue::new("/nonexistent-homedir-target")
            .symlink_to(&fx.home.join(".config/stray"))
            .unwrap();

        let empty = PruneEngine::new(&log).unmerge(&pkg, &fx.home).unwrap();

        assert!(!empty);
        insta::assert_snapshot!(fx.tree(), @r"
        .bashrc
        .config/
        .config/stray -> /nonexistent-homedir-target
        .config/user.toml
        ");
    }

    #[test]
    fn directories_outside_dirs_are_not_descended() {
        let fx = Fixture::new();
        let pkg = fx.package("vim", "", &[".vimrc"]);
        fx.home.join("notes").mkdir().unwrap();
        pkg.location()
            .join(".vimrc")
            .symlink_to(&fx.home.join("notes/vimrc"))
            .unwrap();
        let log = MemoryLog::new();

        PruneEngine::new(&log).unmerge(&pkg, &fx.home).unwrap();

        assert!(fx.home.join("notes/vimrc").is_link());
    }

    #[test]
    fn failed_rmdir_is_logged_and_pruning_continues() {
        use std::os::unix::fs::PermissionsExt;

        let fx = Fixture::new();
        let pkg = fx.package(
            "dev",
            "dirs = [\".config\", \".config/dev\"]\nmkdirs = [\".config\", \".config/dev\"]\n",
            &[".config/dev/settings.toml", ".profile"],
        );
        let log = MemoryLog::new();
        MergeEngine::new(&log).install(&pkg, &fx.home).unwrap();
        let config = fx.home.join(".config");
        fs::set_permissions(&config, fs::Permissions::from_mode(0o555)).unwrap();
        if fs::write(config.join("write-check"), "").is_ok() {
            // Permissions are not enforced for this user.
            fs::set_permissions(&config, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = PruneEngine::new(&log).unmerge(&pkg, &fx.home);
        fs::set_permissions(&config, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(!result.unwrap());
        let errors = log.errors();
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(
            errors[0].starts_with(&format!("unable to remove directory {}", config.join("dev"))),
            "{errors:?}"
        );
        insta::assert_snapshot!(fx.tree(), @r"
        .config/
        .config/dev/
        ");
    }

    #[test]
    fn dangling_links_into_package_are_removed() {
        let fx = Fixture::new();
        let pkg = fx.package("vim", "", &[".vimrc"]);
        let log = MemoryLog::new();
        MergeEngine::new(&log).install(&pkg, &fx.home).unwrap();
        PathValue::new("../pkgs/vim/.exrc")
            .symlink_to(&fx.home.join(".exrc"))
            .unwrap();

        let empty = PruneEngine::new(&log).unmerge(&pkg, &fx.home).unwrap();

        assert!(empty);
        assert_eq!(fx.tree(), "");
    }

    #[test]
    fn split_directory_goes_once_both_owners_are_removed() {
        let fx = Fixture::new();
        let a = fx.package("a", "dirs = [\"shared\"]\n", &["shared/a.txt"]);
        let b = fx.package("b", "dirs = [\"shared\"]\n", &["shared/b.txt"]);
        let catalog = Catalog::from_packages([a.clone(), b.clone()]).unwrap();
        let log = MemoryLog::new();
        let merge = MergeEngine::new(&log).with_catalog(&catalog);
        merge.install(&a, &fx.home).unwrap();
        merge.install(&b, &fx.home).unwrap();
        let prune = PruneEngine::new(&log);

        prune.remove(&a, &fx.home).unwrap();
        insta::assert_snapshot!(fx.tree(), @r"
        shared/
        shared/b.txt -> ../../pkgs/b/shared/b.txt
        ");

        prune.remove(&b, &fx.home).unwrap();
        assert_eq!(fx.tree(), "");
    }

    #[test]
    fn package_inside_destination_is_not_pruned() {
        let fx = Fixture::new();
        let pkg = fx.package("vim", "", &[".vimrc"]);
        let log = MemoryLog::new();
        MergeEngine::new(&log).install(&pkg, &fx.root).unwrap();

        PruneEngine::new(&log).unmerge(&pkg, &fx.root).unwrap();

        assert!(!fx.root.join(".vimrc").lexists());
        assert!(pkg.location().join(".vimrc").is_file());
    }
}
