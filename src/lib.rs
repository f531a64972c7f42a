//! Symlink-farm package manager for home directories.
//!
//! A *package* is a directory of dotfiles with a `.homedir/control.toml`
//! manifest.  Installing a package overlays its tree onto a destination
//! (usually `$HOME`) with relative symlinks; removing it deletes those links
//! again.  Directories shared between packages are split into real
//! directories holding links into each of them.
//!
//! The public API is organised into these layers:
//!
//! - **[`path`]**: normalized paths with relative-path arithmetic
//! - **[`package`]**: manifests, package descriptors and discovery
//! - **[`catalog`]**: the package registry and dependency closures
//! - **[`resources`]**: idempotent `check + apply` primitives (symlinks, hooks)
//! - **[`engine`]**: merge and prune a package against a destination tree
//! - **[`commands`]**: top-level subcommand orchestration (`install`, `remove`, ...)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod exec;
pub mod logging;
pub mod package;
pub mod path;
pub mod resources;
