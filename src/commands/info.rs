//! Command: show package details.
use anyhow::Result;

use super::CommandSetup;
use crate::cli::InfoOpts;
use crate::package::Package;

/// Print the details of one package.
///
/// # Errors
///
/// Returns an error if the package is unknown.
#[allow(clippy::print_stdout)]
pub fn run(setup: &CommandSetup, opts: &InfoOpts) -> Result<()> {
    let found = setup.catalog.find([&opts.package])?;
    for package in found {
        println!("{}", render(package));
    }
    Ok(())
}

/// Control-file style description of `package`.  Empty fields are left out.
#[must_use]
pub fn render(package: &Package) -> String {
    let mut out = vec![
        format!("Package: {}", package.name()),
        format!("Location: {}", package.location()),
    ];
    if let Some(priority) = package.priority() {
        out.push(format!("Priority: {priority}"));
    }
    if let Some(maintainer) = package.maintainer() {
        out.push(format!("Maintainer: {maintainer}"));
    }
    out.push(format!("Standards-Version: {}", package.standards_version()));
    let lists = [
        ("Depends", join(package.depends_names().iter().map(String::as_str))),
        ("Dirs", join(package.dirs().iter().map(String::as_str))),
        ("Mkdirs", join(package.mkdirs().iter().map(String::as_str))),
        (
            "Ubuntu-Packages",
            join(package.ubuntu_packages().iter().map(String::as_str)),
        ),
    ];
    for (field, value) in lists {
        if !value.is_empty() {
            out.push(format!("{field}: {value}"));
        }
    }
    let mut description = package.description().unwrap_or("No Description").lines();
    out.push(format!(
        "Description: {}",
        description.next().unwrap_or_default()
    ));
    out.extend(description.map(|line| format!(" {line}")));
    out.join("\n")
}

fn join<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.collect::<Vec<_>>().join(", ")
}
