//! External process execution.
//!
//! Every compiler, linker and launched executable goes through the
//! [`Executor`] trait so that exit status and output are always captured and
//! so that commands can be exercised in tests without a native toolchain.
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::error::ToolchainError;

/// A single external process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Short human-readable label (usually the artifact being produced).
    pub label: String,
    /// Program to execute.
    pub program: String,
    /// Arguments, one per element; never shell-joined.
    pub args: Vec<String>,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Invocation {
    /// Create an invocation of `program` in `cwd` with no arguments.
    pub fn new(label: impl Into<String>, program: impl Into<String>, cwd: &Path) -> Self {
        Self {
            label: label.into(),
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.to_path_buf(),
        }
    }

    /// Append arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Render as a single line for logging.
    #[must_use]
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            return self.program.clone();
        }
        format!("{} {}", self.program, self.args.join(" "))
    }
}

/// Result of a command execution.
#[derive(Debug, Clone, Default)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, if the process was not terminated by a signal.
    pub code: Option<i32>,
}

impl ExecResult {
    /// Diagnostic text for error reports.
    ///
    /// MSVC writes its errors to stdout, so fall back to stdout when stderr
    /// is empty.
    #[must_use]
    pub fn evidence(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Abstraction over process execution (injectable for testing).
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run `invocation` to completion, capturing its output.
    ///
    /// A non-zero exit is *not* an error here; inspect
    /// [`ExecResult::success`].
    ///
    /// # Errors
    ///
    /// Returns [`ToolchainError::Spawn`] if the process cannot be started.
    fn run(&self, invocation: &Invocation) -> Result<ExecResult, ToolchainError>;

    /// Run `invocation` with inherited stdio and wait for it to exit.
    ///
    /// Returns the exit code (`-1` when terminated by a signal).
    ///
    /// # Errors
    ///
    /// Returns [`ToolchainError::Spawn`] if the process cannot be started.
    fn launch(&self, invocation: &Invocation) -> Result<i32, ToolchainError>;

    /// Check if a program is available on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// Production [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl SystemExecutor {
    fn command(invocation: &Invocation) -> Command {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args).current_dir(&invocation.cwd);
        cmd
    }

    fn spawn_error(invocation: &Invocation) -> impl FnOnce(std::io::Error) -> ToolchainError {
        let program = invocation.program.clone();
        move |source| ToolchainError::Spawn { program, source }
    }
}

impl Executor for SystemExecutor {
    fn run(&self, invocation: &Invocation) -> Result<ExecResult, ToolchainError> {
        let output = Self::command(invocation)
            .stdin(Stdio::null())
            .output()
            .map_err(Self::spawn_error(invocation))?;
        Ok(ExecResult::from(output))
    }

    fn launch(&self, invocation: &Invocation) -> Result<i32, ToolchainError> {
        let status = Self::command(invocation)
            .status()
            .map_err(Self::spawn_error(invocation))?;
        Ok(status.code().unwrap_or(-1))
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
