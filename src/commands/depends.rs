//! Command: show dependency closures.
use anyhow::Result;

use super::CommandSetup;
use crate::cli::DependsOpts;
use crate::package::Package;

/// Print the transitive dependencies (or, with `--reverse`, dependents) of
/// the named packages, one per line.
///
/// # Errors
///
/// Returns an error if a package name is unknown or a dependency is missing.
#[allow(clippy::print_stdout)]
pub fn run(setup: &CommandSetup, opts: &DependsOpts) -> Result<()> {
    for package in closure(setup, opts)? {
        println!("{}", package.name());
    }
    Ok(())
}

/// The closure `opts` asks for, sorted by name.
///
/// # Errors
///
/// Returns an error if a package name is unknown or a dependency is missing.
pub fn closure<'a>(setup: &'a CommandSetup, opts: &DependsOpts) -> Result<Vec<&'a Package>> {
    let catalog = &setup.catalog;
    let packages = if opts.reverse {
        catalog.find_reverse_dependencies(&opts.packages)?
    } else {
        catalog.find_dependencies(&opts.packages)?
    };
    Ok(packages)
}
