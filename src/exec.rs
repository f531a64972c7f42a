//! External command execution for package hook scripts.
use anyhow::{Context as _, Result};
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Output};

/// Result of a command execution.
#[derive(Debug)]
pub struct ExecResult {
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, or `None` if the process was killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Run a command in `dir`, allowing failure.
///
/// # Errors
///
/// Returns an error only if the process cannot be spawned.
pub fn run_in_unchecked<S: AsRef<OsStr>>(
    dir: &Path,
    program: S,
    args: &[&str],
) -> Result<ExecResult> {
    let program = program.as_ref();
    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .with_context(|| {
            format!(
                "failed to execute: {} in {}",
                program.to_string_lossy(),
                dir.display()
            )
        })?;

    Ok(ExecResult::from(output))
}
