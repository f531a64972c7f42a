//! Subcommand implementations and the setup they share.
pub mod depends;
pub mod info;
pub mod install;
pub mod list;
pub mod remove;
pub mod version;

use anyhow::{Context as _, Result};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::logging::{Log, PackageStatus};
use crate::package::{Package, discovery};
use crate::path::PathValue;

/// Shared state produced by the common command setup sequence.
///
/// Holds the resolved configuration and the catalog discovered from the
/// packages directory so that each command does not have to repeat the
/// boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Resolved configuration.
    pub config: Config,
    /// Every package found under `config.packages`.
    pub catalog: Catalog,
}

impl CommandSetup {
    /// Discover the packages named by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the packages directory cannot be scanned or two
    /// packages share a name.
    pub fn init(config: Config, log: &dyn Log) -> Result<Self> {
        log.stage("Discovering packages");
        let catalog = discovery::discover(&config.packages, log)?;
        log.info(&format!(
            "found {} packages in {}",
            catalog.len(),
            config.packages.display()
        ));
        Ok(Self { config, catalog })
    }

    /// The destination tree, which must be an existing directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination is not a directory.
    pub fn dest(&self) -> Result<PathValue> {
        let dest = PathValue::new(&self.config.dest);
        anyhow::ensure!(dest.is_dir(), "destination {dest} is not a directory");
        dest.realpath()
            .with_context(|| format!("resolving destination {dest}"))
    }
}

/// Apply `action` to each package in order, recording every outcome.
///
/// After the first failure the remaining packages are recorded as skipped
/// and that failure is returned.
///
/// # Errors
///
/// Returns the first error produced by `action`.
pub fn run_packages_to_completion(
    packages: &[&Package],
    log: &dyn Log,
    mut action: impl FnMut(&Package) -> Result<()>,
) -> Result<()> {
    let mut failure = None;
    for package in packages {
        if failure.is_some() {
            log.record(
                package.name(),
                PackageStatus::Skipped,
                Some("an earlier package failed"),
            );
            continue;
        }
        match action(package) {
            Ok(()) => log.record(package.name(), PackageStatus::Ok, None),
            Err(e) => {
                log.error(&format!("{}: {e:#}", package.name()));
                log.record(package.name(), PackageStatus::Failed, Some(e.to_string().as_str()));
                failure = Some(e);
            }
        }
    }
    failure.map_or(Ok(()), Err)
}

/// Space-separated package names.
fn joined_names(packages: &[&Package]) -> String {
    packages
        .iter()
        .map(|p| p.name())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::engine::ConflictMode;
    use crate::logging::MemoryLog;
    use crate::package::Control;

    fn pkg(name: &str) -> Package {
        Package::new(
            format!("/nonexistent-homedir-commands-test/{name}"),
            Control::named(name),
        )
        .unwrap()
    }

    #[test]
    fn later_packages_are_skipped_after_failure() {
        let (a, b, c) = (pkg("a"), pkg("b"), pkg("c"));
        let log = MemoryLog::new();

        let err = run_packages_to_completion(&[&a, &b, &c], &log, |p| {
            if p == "b" {
                anyhow::bail!("boom")
            }
            Ok(())
        })
        .unwrap_err();

        assert_eq!(err.to_string(), "boom");
        let statuses: Vec<(String, PackageStatus)> = log
            .package_entries()
            .into_iter()
            .map(|e| (e.name, e.status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("a".to_string(), PackageStatus::Ok),
                ("b".to_string(), PackageStatus::Failed),
                ("c".to_string(), PackageStatus::Skipped),
            ]
        );
        assert_eq!(log.errors(), vec!["b: boom"]);
    }

    #[test]
    fn setup_discovers_packages_and_checks_dest() {
        let tmp = tempfile::tempdir().unwrap();
        let packages = tmp.path().join("packages");
        std::fs::create_dir_all(packages.join("vim/.homedir")).unwrap();
        std::fs::write(
            packages.join("vim/.homedir/control.toml"),
            "package = \"vim\"\n",
        )
        .unwrap();
        let config = Config {
            root: tmp.path().to_path_buf(),
            packages,
            dest: tmp.path().join("missing"),
            on_conflict: ConflictMode::Fail,
            warnings: true,
        };
        let log = MemoryLog::new();

        let setup = CommandSetup::init(config, &log).unwrap();

        assert_eq!(setup.catalog.len(), 1);
        assert!(setup.dest().is_err());
    }

    #[test]
    fn joined_names_uses_spaces() {
        let (a, b) = (pkg("a"), pkg("b"));
        assert_eq!(joined_names(&[&a, &b]), "a b");
    }
}
