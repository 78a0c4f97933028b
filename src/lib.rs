//! Change-detecting build orchestrator.
//!
//! Drives the native toolchain for a project made of a hot-reloadable game
//! module and a platform host executable.  Each invocation mirrors runtime
//! assets into `build/`, fingerprints the source tree and, for `ifchanged`,
//! skips the compile when nothing differs from the previous run.
//!
//! The public API is organised into layers:
//!
//! - **[`fingerprint`]** and **[`mirror`]**: filesystem primitives (snapshots, directory copies)
//! - **[`toolchain`]**: per-platform compiler profiles and their invocation
//! - **[`session`]** and **[`config`]**: project layout and toolchain settings
//! - **[`commands`]**: top-level verb orchestration (`debug`, `ifchanged`, `release`, `clean`, `run`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod fingerprint;
pub mod logging;
pub mod mirror;
pub mod operations;
pub mod platform;
pub mod session;
pub mod toolchain;
