//! Helpers for the log file: its location, timestamps, and escape stripping.
use std::fs;
use std::path::PathBuf;

/// `strftime` layout of the log file header.
pub(super) const HEADER_TIME: &str = "%Y-%m-%d %H:%M:%S UTC";

/// `strftime` layout prefixed to every log file line.
pub(super) const LINE_TIME: &str = "%H:%M:%S%.3f";

/// Remove terminal escape sequences, such as the colours a hook script may
/// print, so the log file stays plain text.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
            continue;
        }
        // CSI: ESC '[' parameters, then one final byte in '@'..='~'.
        if chars.next_if_eq(&'[').is_some() {
            chars.by_ref().find(|c| ('@'..='~').contains(c));
        } else {
            chars.next();
        }
    }
    out
}

/// `$XDG_CACHE_HOME/homedir`, falling back to `~/.cache/homedir`.
/// Created on demand; `None` if that fails.
fn cache_dir() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CACHE_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME")
                .or_else(|| std::env::var_os("USERPROFILE"))
                .map(|home| PathBuf::from(home).join(".cache"))
        })?;
    let dir = base.join("homedir");
    fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

/// Log file for one invocation of `command`.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    Some(cache_dir()?.join(format!("{command}.log")))
}

/// The current UTC time in `layout`.
pub(super) fn timestamp(layout: &str) -> String {
    chrono::Utc::now().format(layout).to_string()
}
