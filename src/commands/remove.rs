//! Remove command implementation.
use anyhow::Result;

use super::{CommandSetup, joined_names, run_packages_to_completion};
use crate::cli::PackageArgs;
use crate::engine::PruneEngine;
use crate::logging::Log;
use crate::package::Package;

/// Run the remove command: the requested packages and every package that
/// depends on them, dependents first.
///
/// # Errors
///
/// Returns an error if a package name is unknown, the destination is not a
/// directory, or a package fails to prune.
pub fn run(setup: &CommandSetup, opts: &PackageArgs, log: &dyn Log) -> Result<()> {
    let packages = plan(setup, &opts.packages)?;
    let dest = setup.dest()?;
    log.info(&format!("removing {}", joined_names(&packages)));

    let engine = PruneEngine::new(log);
    run_packages_to_completion(&packages, log, |package| {
        log.stage(&format!("Removing {}", package.name()));
        engine.remove(package, &dest)
    })
}

/// The requested packages plus their reverse dependencies, in removal order.
///
/// # Errors
///
/// Returns an error naming every unknown package.
pub fn plan<'a>(setup: &'a CommandSetup, names: &[String]) -> Result<Vec<&'a Package>> {
    let catalog = &setup.catalog;
    let mut packages = catalog.find(names)?;
    packages.extend(catalog.find_reverse_dependencies(names)?);
    let mut ordered = catalog.dependency_order(packages);
    ordered.reverse();
    Ok(ordered)
}
