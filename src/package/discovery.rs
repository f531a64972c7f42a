//! Locating packages on disk.
use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context as _, Result};

use super::{Package, is_package_dir};
use crate::catalog::Catalog;
use crate::error::PackageError;
use crate::logging::Log;
use crate::path::PathValue;

/// Scan `top` for packages and register them in a new catalog.
///
/// A directory holding a control manifest is loaded as a package and not
/// descended into; any other directory has its non-hidden subdirectories
/// scanned in sorted order.  Symlinked directories are followed once.
///
/// A package that fails to load is reported through `log` as an error and
/// left out of the catalog.
///
/// # Errors
///
/// Returns an error if `top` cannot be listed, or if two packages share a
/// name ([`CatalogError::DuplicatePackage`](crate::error::CatalogError::DuplicatePackage)).
pub fn discover(top: &Path, log: &dyn Log) -> Result<Catalog> {
    let mut catalog = Catalog::new();
    let mut visited = HashSet::new();
    scan(&PathValue::new(top), &mut catalog, &mut visited, log)
        .with_context(|| format!("scanning packages in {}", top.display()))?;
    log.debug(&format!(
        "discovered {} package(s) in {}",
        catalog.len(),
        top.display()
    ));
    Ok(catalog)
}

fn scan(
    dir: &PathValue,
    catalog: &mut Catalog,
    visited: &mut HashSet<PathValue>,
    log: &dyn Log,
) -> Result<()> {
    let real = dir
        .realpath()
        .with_context(|| format!("resolving {dir}"))?;
    if !visited.insert(real) {
        return Ok(());
    }

    if is_package_dir(dir.as_path()) {
        match Package::load(dir) {
            Ok(package) => {
                log.debug(&format!("found package {} at {dir}", package.name()));
                catalog.register(package)?;
            }
            Err(e) => log.error(&format!("skipping {dir}: {e}")),
        }
        return Ok(());
    }

    for name in dir.list_dir().with_context(|| format!("listing {dir}"))? {
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        let child = dir.join(&name);
        if child.is_dir() {
            scan(&child, catalog, visited, log)?;
        }
    }
    Ok(())
}

/// Find the package owning `path`: the nearest ancestor (or `path` itself)
/// holding a control manifest.
///
/// # Errors
///
/// Returns an error if the owning package's manifest is invalid.
pub fn find_owner(path: &PathValue) -> Result<Option<Package>, PackageError> {
    for ancestor in path.as_path().ancestors() {
        if is_package_dir(ancestor) {
            return Package::load(ancestor).map(Some);
        }
    }
    Ok(None)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::MemoryLog;
    use crate::package::{CONTROL_DIR, control_path};
    use std::fs;

    fn write_package(dir: &Path, manifest: &str) {
        fs::create_dir_all(dir.join(CONTROL_DIR)).unwrap();
        fs::write(control_path(dir), manifest).unwrap();
    }

    #[test]
    fn discover_finds_nested_packages() {
        let tmp = tempfile::tempdir().unwrap();
        write_package(&tmp.path().join("vim"), "package = \"vim\"\n");
        write_package(&tmp.path().join("group/zsh"), "package = \"zsh\"\n");
        fs::create_dir_all(tmp.path().join("empty/dir")).unwrap();
        let log = MemoryLog::new();

        let catalog = discover(tmp.path(), &log).unwrap();

        let names: Vec<&str> = catalog.iter().map(Package::name).collect();
        assert_eq!(names, ["vim", "zsh"]);
        assert!(log.errors().is_empty());
    }

    #[test]
    fn discover_does_not_descend_into_packages() {
        let tmp = tempfile::tempdir().unwrap();
        write_package(&tmp.path().join("outer"), "package = \"outer\"\n");
        write_package(&tmp.path().join("outer/inner"), "package = \"inner\"\n");
        let catalog = discover(tmp.path(), &MemoryLog::new()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("outer").is_some());
    }

    #[test]
    fn discover_skips_hidden_directories() {
        let tmp = tempfile::tempdir().unwrap();
        write_package(&tmp.path().join(".hidden/pkg"), "package = \"pkg\"\n");
        let catalog = discover(tmp.path(), &MemoryLog::new()).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn broken_package_is_logged_and_excluded() {
        let tmp = tempfile::tempdir().unwrap();
        write_package(&tmp.path().join("good"), "package = \"good\"\n");
        write_package(&tmp.path().join("bad"), "package = \"bad\"\nbogus = 1\n");
        let log = MemoryLog::new();

        let catalog = discover(tmp.path(), &log).unwrap();

        assert_eq!(catalog.len(), 1);
        let errors = log.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("bogus"), "error: {}", errors[0]);
    }

    #[test]
    fn duplicate_names_are_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        write_package(&tmp.path().join("a"), "package = \"same\"\n");
        write_package(&tmp.path().join("b"), "package = \"same\"\n");
        let err = discover(tmp.path(), &MemoryLog::new()).unwrap_err();
        assert!(
            err.chain().any(|cause| cause.to_string().contains("duplicate package 'same'")),
            "error: {err:#}"
        );
    }

    #[test]
    fn missing_top_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(discover(&tmp.path().join("nope"), &MemoryLog::new()).is_err());
    }

    #[test]
    fn find_owner_walks_upward() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg_dir = tmp.path().join("emacs");
        write_package(&pkg_dir, "package = \"emacs\"\n");
        fs::create_dir_all(pkg_dir.join(".emacs.d/lisp")).unwrap();

        let owner = find_owner(&PathValue::new(pkg_dir.join(".emacs.d/lisp")))
            .unwrap()
            .expect("owner");
        assert_eq!(owner.name(), "emacs");
    }

    #[test]
    fn find_owner_none_outside_packages() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(find_owner(&PathValue::new(tmp.path())).unwrap().is_none());
    }
}
