//! Command: list available packages.
use super::CommandSetup;
use crate::catalog::Catalog;

/// Print every package with its short description.
#[allow(clippy::print_stdout)]
pub fn run(setup: &CommandSetup) {
    for line in lines(&setup.catalog) {
        println!("{line}");
    }
}

/// One `name - short description` line per package, sorted by name.
#[must_use]
pub fn lines(catalog: &Catalog) -> Vec<String> {
    let width = catalog.iter().map(|p| p.name().len()).max().unwrap_or(0);
    catalog
        .iter()
        .map(|p| format!("{:<width$} - {}", p.name(), p.short_description()))
        .collect()
}
