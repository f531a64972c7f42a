//! In-memory logger for tests and library embedding.
use std::sync::Mutex;

use super::subscriber::STAGE_TARGET;
use super::types::{Log, PackageEntry, PackageStatus};

/// A single captured log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    /// A stage header entry.
    Stage(String),
    /// An informational entry.
    Info(String),
    /// A debug entry.
    Debug(String),
    /// A warning entry.
    Warn(String),
    /// An error entry.
    Error(String),
}

impl LogEntry {
    /// Replay this entry through `tracing`.
    fn replay(&self) {
        match self {
            Self::Stage(msg) => tracing::info!(target: STAGE_TARGET, "{msg}"),
            Self::Info(msg) => tracing::info!("{msg}"),
            Self::Debug(msg) => tracing::debug!("{msg}"),
            Self::Warn(msg) => tracing::warn!("{msg}"),
            Self::Error(msg) => tracing::error!("{msg}"),
        }
    }
}

/// Implement the display methods of [`Log`] by pushing each message into
/// `self.entries` as the corresponding [`LogEntry`] variant.
macro_rules! capture_log_methods {
    ($($method:ident => $variant:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                if let Ok(mut guard) = self.entries.lock() {
                    guard.push(LogEntry::$variant(msg.to_string()));
                }
            }
        )+
    };
}

/// Logger that keeps every entry in memory.
///
/// Nothing reaches the console or the log file until [`replay`](Self::replay)
/// is called.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<LogEntry>>,
    packages: Mutex<Vec<PackageEntry>>,
}

impl MemoryLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured entries, in order.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Messages of the captured warnings, in order.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                LogEntry::Warn(msg) => Some(msg),
                _ => None,
            })
            .collect()
    }

    /// Messages of the captured errors, in order.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                LogEntry::Error(msg) => Some(msg),
                _ => None,
            })
            .collect()
    }

    /// Recorded package outcomes, in order.
    #[must_use]
    pub fn package_entries(&self) -> Vec<PackageEntry> {
        self.packages.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Replay all captured entries through `tracing`.
    pub fn replay(&self) {
        for entry in &self.entries() {
            entry.replay();
        }
    }
}

impl Log for MemoryLog {
    capture_log_methods! {
        stage => Stage,
        info  => Info,
        debug => Debug,
        warn  => Warn,
        error => Error,
    }

    fn record(&self, package: &str, status: PackageStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.packages.lock() {
            guard.push(PackageEntry {
                name: package.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;
    use std::fs;

    #[test]
    fn memory_log_preserves_entry_order() {
        let log = MemoryLog::new();
        log.stage("stage-1");
        log.info("info-1");
        log.debug("debug-1");
        log.warn("warn-1");
        log.error("error-1");
        assert_eq!(
            log.entries(),
            vec![
                LogEntry::Stage("stage-1".to_string()),
                LogEntry::Info("info-1".to_string()),
                LogEntry::Debug("debug-1".to_string()),
                LogEntry::Warn("warn-1".to_string()),
                LogEntry::Error("error-1".to_string()),
            ]
        );
    }

    #[test]
    fn warnings_and_errors_are_filtered() {
        let log = MemoryLog::new();
        log.info("noise");
        log.warn("w1");
        log.error("e1");
        log.warn("w2");
        assert_eq!(log.warnings(), vec!["w1", "w2"]);
        assert_eq!(log.errors(), vec!["e1"]);
    }

    #[test]
    fn record_is_kept() {
        let log = MemoryLog::new();
        log.record("vim", PackageStatus::Ok, None);
        assert_eq!(log.package_entries()[0].name, "vim");
    }

    #[test]
    fn replay_reaches_log_file() {
        let (_logger, tmp, _guard) = isolated_logger();
        let log = MemoryLog::new();
        log.stage("replay-stage");
        log.warn("replay-warn");
        log.replay();
        let contents = fs::read_to_string(tmp.path().join("test.log")).unwrap();
        assert!(contents.contains("----- replay-stage"));
        assert!(contents.contains("WARN  replay-warn"));
    }
}
