//! Domain-specific error types for the build orchestrator.
//!
//! Internal modules return typed errors (e.g., [`FileSystemError`],
//! [`ToolchainError`]) while command handlers at the CLI boundary convert
//! them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! CompileError
//! ├── FileSystem(FileSystemError)  snapshot, mirror, purge, clean I/O
//! ├── Toolchain(ToolchainError)    compiler/linker process failures
//! ├── Platform(PlatformError)      no toolchain profile for the host
//! ├── Command(CommandError)        unknown verb, missing executable
//! └── Config(ConfigError)          compile.toml loading
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the build orchestrator.
#[derive(Error, Debug)]
pub enum CompileError {
    /// Filesystem operation failed.
    #[error("Filesystem error: {0}")]
    FileSystem(#[from] FileSystemError),

    /// External compiler or linker failed.
    #[error("Toolchain error: {0}")]
    Toolchain(#[from] ToolchainError),

    /// Host platform has no registered toolchain profile.
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// User-facing command could not be dispatched.
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    /// Toolchain configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// An I/O failure tied to a specific path.
#[derive(Error, Debug)]
#[error("{action} {}: {source}", .path.display())]
pub struct FileSystemError {
    /// What was being attempted (e.g. `"copying"`, `"reading snapshot"`).
    pub action: &'static str,
    /// Path the operation was applied to.
    pub path: PathBuf,
    /// Underlying I/O error.
    #[source]
    pub source: std::io::Error,
}

impl FileSystemError {
    /// Build an error for `action` on `path`.
    pub fn new(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self {
            action,
            path: path.into(),
            source,
        }
    }

    /// Return a closure suitable for `map_err` that wraps an [`std::io::Error`].
    pub fn wrap(
        action: &'static str,
        path: impl Into<PathBuf>,
    ) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::new(action, path, source)
    }
}

/// Errors raised while invoking the external compiler/linker.
#[derive(Error, Debug)]
pub enum ToolchainError {
    /// The compiler program is not on `PATH`.
    #[error("compiler '{0}' not found on PATH")]
    CompilerNotFound(String),

    /// The process could not be started at all.
    #[error("failed to start '{program}': {source}")]
    Spawn {
        /// Program that was launched.
        program: String,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The process ran and exited unsuccessfully.
    #[error("{label} failed (exit {code}): {output}")]
    InvocationFailed {
        /// Which artifact the invocation was producing.
        label: String,
        /// Process exit code (`-1` when terminated by a signal).
        code: i32,
        /// Captured diagnostic output used as evidence.
        output: String,
    },

    /// The build succeeded but its generation could not be recorded.
    #[error("recording build generation: {0}")]
    Record(#[source] FileSystemError),
}

/// Errors that arise from host platform detection.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// No toolchain profile is registered for this platform.
    #[error("Unsupported platform: {platform}")]
    Unsupported {
        /// Name of the platform (e.g., `"freebsd"`).
        platform: String,
    },
}

/// Errors raised by the command dispatcher itself.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The verb is not one of the known commands.
    #[error("Unrecognized argument: {0}")]
    Unknown(String),

    /// `run` was requested before anything was built.
    #[error("no built executable at {}", .0.display())]
    ExecutableMissing(PathBuf),
}

/// Errors that arise while loading `compile.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("IO error reading config file {}: {source}", .path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has the wrong shape.
    #[error("Invalid TOML in {}: {message}", .path.display())]
    Parse {
        /// Path to the offending file.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
}
