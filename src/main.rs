//! Command-line entry point for `homedir`.

use anyhow::{Context as _, Result};
use clap::Parser;

use homedir::cli::{Cli, Command};
use homedir::commands::{self, CommandSetup};
use homedir::config::{Config, Environment, Overrides};
use homedir::logging::{self, Logger};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    if matches!(args.command, Command::Version) {
        commands::version::run();
        return Ok(());
    }

    logging::init_subscriber(args.verbose, args.command.name());
    let config = Config::resolve(&Overrides::from(&args.global), &Environment::capture())?;
    let log = Logger::new(args.command.name()).with_warnings(config.warnings);
    log.debug(&format!("homedir {}", commands::version::version()));
    let setup = CommandSetup::init(config, &log)?;

    let result = match &args.command {
        Command::Install(opts) => commands::install::run(&setup, opts, &log),
        Command::Remove(opts) => commands::remove::run(&setup, opts, &log),
        Command::List => {
            commands::list::run(&setup);
            Ok(())
        }
        Command::Info(opts) => commands::info::run(&setup, opts),
        Command::Depends(opts) => commands::depends::run(&setup, opts),
        Command::Version => Ok(()),
    };

    log.print_summary();
    let count = log.failure_count();
    if count > 0 {
        return result.with_context(|| format!("{count} package(s) failed"));
    }
    result
}
