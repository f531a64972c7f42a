//! The merge and prune engines that reconcile package trees with a
//! destination tree.
//!
//! - **[`merge`]**: install a package by linking its entries into the
//!   destination, splitting shared directories and consulting a
//!   [`ConflictPolicy`](policy::ConflictPolicy) for obstructions.
//! - **[`prune`]**: remove a package by deleting the links that resolve into
//!   it and the directories that become empty.
pub mod merge;
pub mod policy;
pub mod prune;

pub use merge::MergeEngine;
pub use policy::{BackupConflicts, ConflictMode, ConflictPolicy, FailOnConflict, SkipConflicts};
pub use prune::PruneEngine;
