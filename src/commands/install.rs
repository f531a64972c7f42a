//! Install command implementation.
use anyhow::Result;

use super::{CommandSetup, joined_names, run_packages_to_completion};
use crate::cli::PackageArgs;
use crate::engine::MergeEngine;
use crate::logging::Log;
use crate::package::Package;

/// Run the install command: the requested packages and everything they
/// depend on, dependencies first.
///
/// # Errors
///
/// Returns an error if a package name is unknown, the destination is not a
/// directory, or a package fails to merge.
pub fn run(setup: &CommandSetup, opts: &PackageArgs, log: &dyn Log) -> Result<()> {
    let packages = plan(setup, &opts.packages)?;
    let dest = setup.dest()?;
    log.info(&format!("installing {}", joined_names(&packages)));

    let policy = setup.config.on_conflict.policy(log);
    let engine = MergeEngine::new(log)
        .with_policy(policy.as_ref())
        .with_catalog(&setup.catalog);

    run_packages_to_completion(&packages, log, |package| {
        log.stage(&format!("Installing {}", package.name()));
        engine.install(package, &dest)
    })
}

/// The requested packages plus their dependencies, in install order.
///
/// # Errors
///
/// Returns an error naming every unknown package.
pub fn plan<'a>(setup: &'a CommandSetup, names: &[String]) -> Result<Vec<&'a Package>> {
    let catalog = &setup.catalog;
    let mut packages = catalog.find_dependencies(names)?;
    packages.extend(catalog.find(names)?);
    Ok(catalog.dependency_order(packages))
}
