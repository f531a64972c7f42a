// Shared helpers for integration tests.
//
// Provides a temporary homedir root with a `packages/` directory and a
// separate destination tree, plus a fluent builder so each integration test
// can lay out its packages without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use homedir::commands::CommandSetup;
use homedir::config::{Config, Environment, Overrides};
use homedir::logging::MemoryLog;

/// An isolated homedir root and destination backed by a [`tempfile::TempDir`].
///
/// Layout: `<tmp>/root/packages/<name>/...` and `<tmp>/home/`.
pub struct IntegrationTestContext {
    tmp: tempfile::TempDir,
    base: PathBuf,
}

impl IntegrationTestContext {
    /// Create an empty root and destination.
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let base = std::fs::canonicalize(tmp.path()).expect("canonicalize temp dir");
        std::fs::create_dir_all(base.join("root/packages")).expect("create packages dir");
        std::fs::create_dir_all(base.join("home")).expect("create home dir");
        Self { tmp, base }
    }

    /// The homedir root.
    pub fn root_path(&self) -> PathBuf {
        self.base.join("root")
    }

    /// The destination tree.
    pub fn home_path(&self) -> PathBuf {
        self.base.join("home")
    }

    /// Directory of package `name`.
    pub fn package_path(&self, name: &str) -> PathBuf {
        self.root_path().join("packages").join(name)
    }

    /// Resolve configuration the way the binary does, with `--root` and
    /// `--dest` pointing into the temporary directory.
    pub fn config(&self) -> Config {
        let overrides = Overrides {
            root: Some(self.root_path()),
            dest: Some(self.home_path()),
            ..Overrides::default()
        };
        Config::resolve(&overrides, &Environment::default()).expect("resolve config")
    }

    /// Discover packages into a command setup.
    pub fn setup(&self, log: &MemoryLog) -> CommandSetup {
        CommandSetup::init(self.config(), log).expect("command setup")
    }

    /// Sorted listing of the destination tree: `dir/`, `file`, or
    /// `link -> stored target`, one per line.  Links are not followed.
    pub fn tree(&self) -> String {
        let mut lines = Vec::new();
        walk(&self.home_path(), Path::new(""), &mut lines);
        lines.join("\n")
    }
}

fn walk(dir: &Path, prefix: &Path, lines: &mut Vec<String>) {
    let mut names: Vec<_> = std::fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("dir entry").file_name())
        .collect();
    names.sort();
    for name in names {
        let path = dir.join(&name);
        let shown = prefix.join(&name);
        let meta = std::fs::symlink_metadata(&path).expect("metadata");
        if meta.file_type().is_symlink() {
            let target = std::fs::read_link(&path).expect("read link");
            lines.push(format!("{} -> {}", shown.display(), target.display()));
        } else if meta.is_dir() {
            lines.push(format!("{}/", shown.display()));
            walk(&path, &shown, lines);
        } else {
            lines.push(shown.display().to_string());
        }
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new context with no packages.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Add package `name` whose manifest is `package = "<name>"` followed by
    /// `manifest`.  Entries ending in `/` are directories; anything else is a
    /// file containing its own relative path.
    pub fn with_package(self, name: &str, manifest: &str, entries: &[&str]) -> Self {
        let dir = self.ctx.package_path(name);
        std::fs::create_dir_all(dir.join(".homedir")).expect("create control dir");
        std::fs::write(
            dir.join(".homedir/control.toml"),
            format!("package = \"{name}\"\n{manifest}"),
        )
        .expect("write control.toml");
        for entry in entries {
            let path = dir.join(entry);
            if entry.ends_with('/') {
                std::fs::create_dir_all(&path).expect("create package dir");
            } else {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).expect("create package file parent");
                }
                std::fs::write(&path, entry).expect("write package file");
            }
        }
        self
    }

    /// Write `content` to `<root>/config.toml`.
    pub fn with_config_file(self, content: &str) -> Self {
        std::fs::write(self.ctx.root_path().join("config.toml"), content)
            .expect("write config file");
        self
    }

    /// Write `content` to `<dest>/<relative>`, as a file the user owns.
    pub fn with_home_file(self, relative: &str, content: &str) -> Self {
        let path = self.ctx.home_path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create home file parent");
        }
        std::fs::write(path, content).expect("write home file");
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}
