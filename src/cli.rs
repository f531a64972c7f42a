//! Command-line definitions.
use clap::{Parser, Subcommand};

use crate::config::Overrides;
use crate::engine::ConflictMode;

/// Top-level CLI entry point for the homedir package manager.
#[derive(Parser, Debug)]
#[command(
    name = "homedir",
    about = "Manage a home directory as a farm of symlinks into packages",
    version
)]
pub struct Cli {
    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options accepted by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Override the homedir root (default: $HOMEDIR_ROOT or ~/.homedir)
    #[arg(long, global = true)]
    pub root: Option<std::path::PathBuf>,

    /// Destination tree to link packages into (default: $HOME)
    #[arg(long, global = true)]
    pub dest: Option<std::path::PathBuf>,

    /// What to do when an existing file is in the way
    #[arg(long, value_enum, global = true)]
    pub on_conflict: Option<ConflictMode>,

    /// Suppress warnings
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl From<&GlobalOpts> for Overrides {
    fn from(opts: &GlobalOpts) -> Self {
        Self {
            root: opts.root.clone(),
            dest: opts.dest.clone(),
            on_conflict: opts.on_conflict,
            quiet: opts.quiet,
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install packages and their dependencies
    Install(PackageArgs),
    /// Remove packages and the packages that depend on them
    Remove(PackageArgs),
    /// List available packages
    List,
    /// Show package details
    Info(InfoOpts),
    /// Show the dependencies of packages
    Depends(DependsOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Install(_) => "install",
            Self::Remove(_) => "remove",
            Self::List => "list",
            Self::Info(_) => "info",
            Self::Depends(_) => "depends",
            Self::Version => "version",
        }
    }
}

/// Package names for `install` and `remove`.
#[derive(Parser, Debug, Clone)]
pub struct PackageArgs {
    /// Package names
    #[arg(required = true)]
    pub packages: Vec<String>,
}

/// Options for the `info` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct InfoOpts {
    /// Package name
    pub package: String,
}

/// Options for the `depends` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct DependsOpts {
    /// List the packages that depend on these instead
    #[arg(short, long)]
    pub reverse: bool,

    /// Package names
    #[arg(required = true)]
    pub packages: Vec<String>,
}
