//! Runtime configuration: command-line overrides, environment, and
//! `<root>/config.toml`, in that order of precedence.
pub mod toml_loader;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::engine::ConflictMode;

/// Name of the optional configuration file inside the homedir root.
pub const CONFIG_FILE: &str = "config.toml";

/// Default packages directory inside the homedir root.
pub const PACKAGES_DIR: &str = "packages";

/// Environment variable overriding the homedir root.
pub const ROOT_ENV: &str = "HOMEDIR_ROOT";

/// Default homedir root, relative to the home directory.
pub const DEFAULT_ROOT_DIR: &str = ".homedir";

/// Contents of `config.toml`.  Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    /// Packages directory; relative paths are taken from the root.
    pub packages: Option<PathBuf>,
    /// Destination tree; relative paths are taken from the root.
    pub dest: Option<PathBuf>,
    /// Conflict handling.
    pub on_conflict: Option<ConflictMode>,
    /// Show warnings.
    pub warnings: Option<bool>,
}

/// The parts of the process environment configuration depends on.
#[derive(Debug, Default, Clone)]
pub struct Environment {
    /// `$HOMEDIR_ROOT`
    pub homedir_root: Option<PathBuf>,
    /// `$HOME`, or `%USERPROFILE%` on Windows.
    pub home: Option<PathBuf>,
}

impl Environment {
    /// Read the current process environment.
    #[must_use]
    pub fn capture() -> Self {
        let var = |name: &str| {
            std::env::var_os(name)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        };
        Self {
            homedir_root: var(ROOT_ENV),
            home: var("HOME").or_else(|| var("USERPROFILE")),
        }
    }
}

/// Values given on the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    /// `--root`
    pub root: Option<PathBuf>,
    /// `--dest`
    pub dest: Option<PathBuf>,
    /// `--on-conflict`
    pub on_conflict: Option<ConflictMode>,
    /// `--quiet`
    pub quiet: bool,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The homedir root holding `config.toml` and, by default, `packages/`.
    pub root: PathBuf,
    /// Directory scanned for packages.
    pub packages: PathBuf,
    /// Destination tree packages are installed into.
    pub dest: PathBuf,
    /// How obstructions are handled.
    pub on_conflict: ConflictMode,
    /// Whether warnings are shown.
    pub warnings: bool,
}

impl Config {
    /// Combine `overrides`, `env` and the root's `config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither the root nor the destination can be
    /// determined, or if `config.toml` is unreadable or invalid.
    pub fn resolve(overrides: &Overrides, env: &Environment) -> Result<Self> {
        let root = overrides
            .root
            .clone()
            .or_else(|| env.homedir_root.clone())
            .or_else(|| env.home.as_ref().map(|home| home.join(DEFAULT_ROOT_DIR)))
            .context("cannot determine the homedir root. Use --root or set HOMEDIR_ROOT")?;

        let file: ConfigFile = toml_loader::load_config(&root.join(CONFIG_FILE))
            .with_context(|| format!("loading configuration from {}", root.display()))?;

        let packages = file
            .packages
            .map_or_else(|| root.join(PACKAGES_DIR), |p| under(&root, p));
        let dest = overrides
            .dest
            .clone()
            .or_else(|| file.dest.map(|d| under(&root, d)))
            .or_else(|| env.home.clone())
            .context("cannot determine the destination. Use --dest or set HOME")?;

        Ok(Self {
            packages,
            dest,
            on_conflict: overrides
                .on_conflict
                .or(file.on_conflict)
                .unwrap_or_default(),
            warnings: !overrides.quiet && file.warnings.unwrap_or(true),
            root,
        })
    }
}

fn under(root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}
