//! Install a package into a destination tree.
use std::borrow::Cow;
use std::ffi::OsStr;
use std::fmt;

use anyhow::{Context as _, Result};

use super::policy::{ConflictPolicy, FailOnConflict};
use crate::catalog::Catalog;
use crate::error::MergeError;
use crate::logging::Log;
use crate::package::{CONTROL_DIR, IGNORE_DIRS, Package, discovery};
use crate::path::PathValue;
use crate::resources::hook::{Hook, HookScript};
use crate::resources::symlink::RelativeSymlink;
use crate::resources::{Applicable, ResourceChange};

static FAIL_ON_CONFLICT: FailOnConflict = FailOnConflict;

/// Overlays package trees onto a destination with relative symlinks.
///
/// Directories listed in a package's `dirs` are linked whole unless another
/// package already owns the same path, in which case the link is split into
/// a real directory holding links into both packages.  Entries listed in
/// `mkdirs` are always real directories.  Anything else in the way is handed
/// to the [`ConflictPolicy`].
pub struct MergeEngine<'a> {
    policy: &'a dyn ConflictPolicy,
    log: &'a dyn Log,
    catalog: Option<&'a Catalog>,
}

impl<'a> MergeEngine<'a> {
    /// An engine that fails on the first conflict.
    #[must_use]
    pub const fn new(log: &'a dyn Log) -> Self {
        Self {
            policy: &FAIL_ON_CONFLICT,
            log,
            catalog: None,
        }
    }

    /// Resolve conflicts with `policy` instead.
    #[must_use]
    pub const fn with_policy(mut self, policy: &'a dyn ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Look up owners of foreign links in `catalog` before searching the disk.
    #[must_use]
    pub const fn with_catalog(mut self, catalog: &'a Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Run the install hooks around merging `package` into `dest_root`.
    ///
    /// # Errors
    ///
    /// Returns an error if a conflict is not resolved or the filesystem
    /// refuses a change.
    pub fn install(&self, package: &Package, dest_root: &PathValue) -> Result<()> {
        self.run_hook(package, Hook::PreInstall)?;
        self.merge(package, package.location(), dest_root)
            .with_context(|| format!("installing {} into {dest_root}", package.name()))?;
        self.run_hook(package, Hook::PostInstall)
    }

    /// Merge the entries of `src` (a directory inside `package`) into `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if a conflict is not resolved or the filesystem
    /// refuses a change.
    pub fn merge(&self, package: &Package, src: &PathValue, dest: &PathValue) -> Result<()> {
        let dest = dest
            .realpath()
            .with_context(|| format!("resolving {dest}"))?;
        let at_root = src == package.location();
        let names = src
            .list_dir()
            .with_context(|| format!("listing {src}"))?;

        for name in names {
            if IGNORE_DIRS.iter().any(|ignored| name == *ignored) {
                continue;
            }
            if at_root && name == CONTROL_DIR {
                continue;
            }
            if src.join(&name).is_dir() {
                self.merge_dir(package, src, &dest, &name)?;
            } else {
                self.merge_file(package, src, &dest, &name)?;
            }
        }
        Ok(())
    }

    fn merge_dir(
        &self,
        package: &Package,
        src: &PathValue,
        dest: &PathValue,
        name: &OsStr,
    ) -> Result<()> {
        let src_path = src.join(name);
        let dest_path = dest.join(name);

        if !package.src_dirs().contains(&src_path) {
            self.log
                .debug(&format!("{src_path} is not listed in dirs, skipping"));
            return Ok(());
        }

        let materialize = package.src_mkdirs().contains(&src_path);
        if materialize && !dest_path.lexists() {
            dest_path
                .mkdir()
                .with_context(|| format!("creating {dest_path}"))?;
            self.log.debug(&format!("created directory {dest_path}"));
        }

        if dest_path.is_link() {
            let target = dest_path
                .realpath()
                .with_context(|| format!("resolving {dest_path}"))?;

            if package.is_within_location(&target) {
                if !materialize {
                    return self.link(&src_path, &dest_path);
                }
                self.log
                    .debug(&format!("replacing {dest_path} with a directory"));
                self.clear(&dest_path)?;
                return self.place_dir(package, &src_path, &dest_path, materialize);
            }

            if !target.exists() {
                if self.ask(&src_path, &dest_path)? {
                    return self.place_dir(package, &src_path, &dest_path, materialize);
                }
                return Ok(());
            }

            if target == src_path {
                self.log
                    .warn(&format!("{dest_path} already points to {src_path}"));
                return Ok(());
            }

            if !src_path.is_dir() {
                return Err(MergeError::UnexpectedState {
                    path: src_path.to_path_buf(),
                    reason: "listed in dirs but is not a directory".to_string(),
                }
                .into());
            }

            return match self.owner_of(&target)? {
                Some(owner) => self.split(package, &src_path, &owner, &target, &dest_path),
                None => {
                    if self.ask(&src_path, &dest_path)? {
                        self.place_dir(package, &src_path, &dest_path, materialize)
                    } else {
                        Ok(())
                    }
                }
            };
        }

        if dest_path.is_dir() {
            return self.merge(package, &src_path, &dest_path);
        }

        if dest_path.lexists() {
            if self.ask(&src_path, &dest_path)? {
                return self.place_dir(package, &src_path, &dest_path, materialize);
            }
            return Ok(());
        }

        self.place_dir(package, &src_path, &dest_path, materialize)
    }

    fn merge_file(
        &self,
        package: &Package,
        src: &PathValue,
        dest: &PathValue,
        name: &OsStr,
    ) -> Result<()> {
        let src_path = src.join(name);
        let dest_path = dest.join(name);

        if dest_path.is_link() {
            let target = dest_path
                .realpath()
                .with_context(|| format!("resolving {dest_path}"))?;

            if !target.exists() {
                self.log
                    .debug(&format!("replacing dangling link {dest_path}"));
                return self.link(&src_path, &dest_path);
            }

            if target == src_path {
                return self.link(&src_path, &dest_path);
            }

            if package.is_within_location(&target) {
                self.log
                    .warn(&format!("{dest_path} already points into {}", package.name()));
                return Ok(());
            }
        }

        if dest_path.lexists() && !self.ask(&src_path, &dest_path)? {
            return Ok(());
        }
        self.link(&src_path, &dest_path)
    }

    /// Replace the link at `dest_path` with a real directory holding the
    /// entries of both packages.
    fn split(
        &self,
        package: &Package,
        src_path: &PathValue,
        owner: &Package,
        target: &PathValue,
        dest_path: &PathValue,
    ) -> Result<()> {
        self.log.info(&format!(
            "splitting {dest_path} between {} and {}",
            package.name(),
            owner.name()
        ));
        dest_path
            .unlink()
            .with_context(|| format!("removing link {dest_path}"))?;
        dest_path
            .mkdir()
            .with_context(|| format!("creating {dest_path}"))?;
        self.merge(package, src_path, dest_path)?;
        self.merge(owner, target, dest_path)
    }

    /// Consult the policy about the obstruction at `dest_path`.  After an
    /// approval whatever is still there is removed.
    fn ask(&self, src_path: &PathValue, dest_path: &PathValue) -> Result<bool> {
        if !self.policy.resolve(src_path, dest_path)? {
            return Ok(false);
        }
        self.clear(dest_path)?;
        Ok(true)
    }

    /// Remove a symlink or file at `dest_path`.
    fn clear(&self, dest_path: &PathValue) -> Result<()> {
        if !dest_path.lexists() {
            return Ok(());
        }
        if !dest_path.is_link() && dest_path.is_dir() {
            return Err(MergeError::UnexpectedState {
                path: dest_path.to_path_buf(),
                reason: "a directory is in the way".to_string(),
            }
            .into());
        }
        dest_path
            .unlink()
            .with_context(|| format!("removing {dest_path}"))?;
        self.log.debug(&format!("removed {dest_path}"));
        Ok(())
    }

    fn place_dir(
        &self,
        package: &Package,
        src_path: &PathValue,
        dest_path: &PathValue,
        materialize: bool,
    ) -> Result<()> {
        if !materialize {
            return self.link(src_path, dest_path);
        }
        dest_path
            .mkdir()
            .with_context(|| format!("creating {dest_path}"))?;
        self.log.debug(&format!("created directory {dest_path}"));
        self.merge(package, src_path, dest_path)
    }

    fn link(&self, src_path: &PathValue, dest_path: &PathValue) -> Result<()> {
        let symlink = RelativeSymlink::new(src_path.clone(), dest_path.clone());
        if symlink.apply()? == ResourceChange::Applied {
            self.log.debug(&format!("linked {}", symlink.description()));
        }
        Ok(())
    }

    fn owner_of(&self, target: &PathValue) -> Result<Option<Cow<'a, Package>>> {
        if let Some(owner) = self.catalog.and_then(|catalog| catalog.owner_of(target)) {
            return Ok(Some(Cow::Borrowed(owner)));
        }
        let owner = discovery::find_owner(target)
            .with_context(|| format!("looking for the package owning {target}"))?;
        Ok(owner.map(Cow::Owned))
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

impl fmt::Debug for MergeEngine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeEngine")
            .field("catalog", &self.catalog.map(Catalog::len))
            .finish_non_exhaustive()
    }
}
