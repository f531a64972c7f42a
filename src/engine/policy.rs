//! Conflict policies: what to do when something the engine does not own is
//! in the way of a link.
use std::fmt;

use anyhow::{Context as _, Result};
use serde::Deserialize;

use crate::error::ConflictError;
use crate::logging::Log;
use crate::path::PathValue;

/// Suffix appended to backed-up obstructions.
pub const BACKUP_SUFFIX: &str = ".homedir-backup";

/// Decides whether an obstruction at `dest` may be replaced by a link to `src`.
#[cfg_attr(test, mockall::automock)]
pub trait ConflictPolicy {
    /// Return `Ok(true)` to proceed (the obstruction was cleared, or an
    /// overwrite is approved) and `Ok(false)` to leave `dest` untouched.
    ///
    /// # Errors
    ///
    /// Returns an error to abort the merge, typically a [`ConflictError`].
    fn resolve(&self, src: &PathValue, dest: &PathValue) -> Result<bool>;
}

/// Abort on every conflict.  This is the default policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailOnConflict;

impl ConflictPolicy for FailOnConflict {
    fn resolve(&self, src: &PathValue, dest: &PathValue) -> Result<bool> {
        Err(ConflictError {
            src: src.to_path_buf(),
            dest: dest.to_path_buf(),
        }
        .into())
    }
}

/// Warn and leave every conflicting entry alone.
pub struct SkipConflicts<'a> {
    log: &'a dyn Log,
}

impl<'a> SkipConflicts<'a> {
    /// Report skipped entries to `log`.
    #[must_use]
    pub const fn new(log: &'a dyn Log) -> Self {
        Self { log }
    }
}

impl ConflictPolicy for SkipConflicts<'_> {
    fn resolve(&self, src: &PathValue, dest: &PathValue) -> Result<bool> {
        self.log
            .warn(&format!("skipping {dest}: it prevents linking {src}"));
        Ok(false)
    }
}

impl fmt::Debug for SkipConflicts<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkipConflicts").finish_non_exhaustive()
    }
}

/// Move the obstruction aside to `<dest>.homedir-backup` (or
/// `<dest>.homedir-backup.N` if that is taken) and proceed.
pub struct BackupConflicts<'a> {
    log: &'a dyn Log,
}

impl<'a> BackupConflicts<'a> {
    /// Report backups to `log`.
    #[must_use]
    pub const fn new(log: &'a dyn Log) -> Self {
        Self { log }
    }

    /// First free backup path for `dest`.
    #[must_use]
    pub fn backup_path(dest: &PathValue) -> PathValue {
        let base = format!("{dest}{BACKUP_SUFFIX}");
        let first = PathValue::new(&base);
        if !first.lexists() {
            return first;
        }
        (1..u32::MAX)
            .map(|n| PathValue::new(format!("{base}.{n}")))
            .find(|candidate| !candidate.lexists())
            .unwrap_or(first)
    }
}

impl ConflictPolicy for BackupConflicts<'_> {
    fn resolve(&self, src: &PathValue, dest: &PathValue) -> Result<bool> {
        let backup = Self::backup_path(dest);
        dest.rename(&backup)
            .with_context(|| format!("backing up {dest} to {backup}"))?;
        self.log
            .warn(&format!("moved {dest} to {backup} to link {src}"));
        Ok(true)
    }
}

impl fmt::Debug for BackupConflicts<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackupConflicts").finish_non_exhaustive()
    }
}

/// Selects a built-in [`ConflictPolicy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConflictMode {
    /// [`FailOnConflict`]
    #[default]
    Fail,
    /// [`SkipConflicts`]
    Skip,
    /// [`BackupConflicts`]
    Backup,
}

impl ConflictMode {
    /// Build the policy this mode names.
    #[must_use]
    pub fn policy<'a>(self, log: &'a dyn Log) -> Box<dyn ConflictPolicy + 'a> {
        match self {
            Self::Fail => Box::new(FailOnConflict),
            Self::Skip => Box::new(SkipConflicts::new(log)),
            Self::Backup => Box::new(BackupConflicts::new(log)),
        }
    }
}

impl fmt::Display for ConflictMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fail => "fail",
            Self::Skip => "skip",
            Self::Backup => "backup",
        })
    }
}
