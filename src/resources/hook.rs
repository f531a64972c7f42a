//! Package hook script resource.
use std::fmt;

use anyhow::Result;

use super::{Applicable, ResourceChange};
use crate::exec;
use crate::logging::Log;
use crate::package::Package;
use crate::path::PathValue;

/// The four lifecycle points a package may hook into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// Before merging.
    PreInstall,
    /// After merging.
    PostInstall,
    /// Before pruning.
    PreRemove,
    /// After pruning.
    PostRemove,
}

impl Hook {
    /// Script file name inside the package control directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::PreInstall => "pre-install",
            Self::PostInstall => "post-install",
            Self::PreRemove => "pre-remove",
            Self::PostRemove => "post-remove",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// An optional executable in `<package>/.homedir/` run with no arguments
/// from the package location.
///
/// Standard output is logged as info and standard error as warnings, one
/// line each.  The exit status is logged at debug level and otherwise
/// ignored; failing to spawn the script is a warning.
pub struct HookScript<'a> {
    hook: Hook,
    package: String,
    script: PathValue,
    dir: PathValue,
    log: &'a dyn Log,
}

impl<'a> HookScript<'a> {
    /// The `hook` script of `package`.
    #[must_use]
    pub fn new(package: &Package, hook: Hook, log: &'a dyn Log) -> Self {
        Self {
            hook,
            package: package.name().to_string(),
            script: package.hook_path(hook.file_name()),
            dir: package.location().clone(),
            log,
        }
    }
}

impl fmt::Debug for HookScript<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookScript")
            .field("hook", &self.hook)
            .field("package", &self.package)
            .field("script", &self.script)
            .finish_non_exhaustive()
    }
}

impl Applicable for HookScript<'_> {
    fn description(&self) -> String {
        format!("{} {}", self.package, self.hook)
    }

    fn apply(&self) -> Result<ResourceChange> {
        if !self.script.is_executable() {
            let reason = if self.script.lexists() {
                "not executable"
            } else {
                "absent"
            };
            return Ok(ResourceChange::Skipped {
                reason: reason.to_string(),
            });
        }

        self.log.debug(&format!("running {}", self.script));
        match exec::run_in_unchecked(self.dir.as_path(), self.script.as_path(), &[]) {
            Ok(result) => {
                for line in result.stdout.lines().filter(|l| !l.trim().is_empty()) {
                    self.log.info(&format!("{}: {line}", self.hook));
                }
                for line in result.stderr.lines().filter(|l| !l.trim().is_empty()) {
                    self.log.warn(&format!("{}: {line}", self.hook));
                }
                if result.success {
                    self.log.debug(&format!("{} finished", self.description()));
                } else {
                    let status = result
                        .code
                        .map_or_else(|| "a signal".to_string(), |c| c.to_string());
                    self.log
                        .debug(&format!("{} exited with {status}", self.description()));
                }
                Ok(ResourceChange::Applied)
            }
            Err(e) => {
                self.log
                    .warn(&format!("{} could not run: {e:#}", self.description()));
                Ok(ResourceChange::Skipped {
                    reason: e.to_string(),
                })
            }
        }
    }
}
