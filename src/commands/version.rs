//! Command: print version information.

/// Version string embedded at build time.
#[must_use]
pub fn version() -> &'static str {
    option_env!("HOMEDIR_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the homedir version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("homedir {}", version());
}
