//! Relative symlink resource.
use anyhow::{Context as _, Result};

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::MergeError;
use crate::path::PathValue;

/// A symlink at `link` whose stored content is the path of `source` relative
/// to the link's directory.
#[derive(Debug, Clone)]
pub struct RelativeSymlink {
    /// The absolute file or directory the link resolves to.
    pub source: PathValue,
    /// Where the link lives.
    pub link: PathValue,
}

impl RelativeSymlink {
    /// Create a new relative symlink resource.
    #[must_use]
    pub const fn new(source: PathValue, link: PathValue) -> Self {
        Self { source, link }
    }

    /// The relative path stored in the link.
    ///
    /// # Errors
    ///
    /// Returns an error if `source` and `link` are not both absolute.
    pub fn target(&self) -> Result<PathValue> {
        Ok(self.source.relative_path_from(&self.link.dirname())?)
    }
}

impl Applicable for RelativeSymlink {
    fn description(&self) -> String {
        format!("{} -> {}", self.link, self.source)
    }

    /// Create the link, replacing an existing symlink.  Anything else at
    /// `link` is an error: callers clear obstructions first.
    fn apply(&self) -> Result<ResourceChange> {
        let target = self.target()?;
        match self.current_state()? {
            ResourceState::Correct => return Ok(ResourceChange::AlreadyCorrect),
            ResourceState::Incorrect { .. } => {
                self.link
                    .unlink()
                    .with_context(|| format!("remove existing link: {}", self.link))?;
            }
            ResourceState::Invalid { reason } => {
                return Err(MergeError::UnexpectedState {
                    path: self.link.to_path_buf(),
                    reason,
                }
                .into());
            }
            ResourceState::Missing => {}
        }

        target
            .symlink_to(&self.link)
            .with_context(|| format!("create link: {} -> {target}", self.link))?;
        Ok(ResourceChange::Applied)
    }

    /// Delete the link.  A real file or directory at `link` is an error.
    fn remove(&self) -> Result<ResourceChange> {
        if self.link.is_link() {
            self.link
                .unlink()
                .with_context(|| format!("remove link: {}", self.link))?;
            Ok(ResourceChange::Applied)
        } else if self.link.lexists() {
            Err(MergeError::UnexpectedState {
                path: self.link.to_path_buf(),
                reason: "is not a symlink".to_string(),
            }
            .into())
        } else {
            Ok(ResourceChange::AlreadyCorrect)
        }
    }
}

impl Resource for RelativeSymlink {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.link.lexists() {
            return Ok(ResourceState::Missing);
        }
        if !self.link.is_link() {
            return Ok(ResourceState::Invalid {
                reason: "is not a symlink".to_string(),
            });
        }
        let existing = self
            .link
            .read_link()
            .with_context(|| format!("read link: {}", self.link))?;
        if existing == self.target()? {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: format!("points to {existing}"),
            })
        }
    }
}
