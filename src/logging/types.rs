//! Core logging types: package entries, status, and the [`Log`] trait.

/// Per-package outcome for summary reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    /// Package name.
    pub name: String,
    /// Final status of the package.
    pub status: PackageStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Outcome of installing or removing one package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageStatus {
    /// The package was merged or pruned without error.
    Ok,
    /// The package was not processed because an earlier package failed.
    Skipped,
    /// The package failed part-way; the destination may be partially merged.
    Failed,
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) forwards to `tracing`;
/// [`MemoryLog`](super::memory::MemoryLog) keeps everything in memory.  The
/// merge and prune engines only ever see a `&dyn Log`.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Record a package outcome for the summary.
    fn record(&self, package: &str, status: PackageStatus, message: Option<&str>);
}
