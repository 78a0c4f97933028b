//! The `debug`, `ifchanged`, `release`, `clean` and `run` commands.
pub mod clean;
pub mod debug;
pub mod ifchanged;
pub mod release;
pub mod run;

use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::{self, ToolchainConfig};
use crate::error::CommandError;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, StepStatus};
use crate::mirror;
use crate::operations::{FileSystemOps, SystemFileSystemOps};
use crate::platform::{Os, Platform};
use crate::session::{self, Session};
use crate::toolchain::ProfileRegistry;

/// A parsed command-line verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Build debug artifacts unconditionally.
    Debug {
        /// Open the executable in Visual Studio afterwards.
        devenv: bool,
    },
    /// Build debug artifacts if the source tree changed.
    IfChanged {
        /// Open the executable in Visual Studio afterwards.
        devenv: bool,
    },
    /// Build release artifacts.
    Release,
    /// Empty the build directory.
    Clean,
    /// Launch the built executable.
    Run,
    /// Anything else; reported and ignored.
    Unknown(String),
}

impl Command {
    /// Short name, used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Debug { .. } => "debug",
            Self::IfChanged { .. } => "ifchanged",
            Self::Release => "release",
            Self::Clean => "clean",
            Self::Run => "run",
            Self::Unknown(_) => "unknown",
        }
    }
}

/// What a command ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Artifacts were compiled.
    Built,
    /// Sources were unchanged; nothing ran.
    UpToDate,
    /// The build directory was emptied, possibly with entries left behind.
    Cleaned {
        /// Entries deleted.
        removed: usize,
        /// Entries that could not be deleted.
        failed: usize,
    },
    /// The executable ran and exited with this code.
    Launched(i32),
    /// The host has no toolchain profile; nothing ran.
    Unsupported,
    /// The verb was not recognised; nothing ran.
    Unrecognized,
}

/// Shared state for command execution.
pub struct Context {
    /// Resolved project paths and build generation.
    pub session: Session,
    /// Toolchain configuration.
    pub config: ToolchainConfig,
    /// Host platform.
    pub platform: Platform,
    /// Profile constructors per platform.
    pub registry: ProfileRegistry,
    /// Logger for output and step recording.
    pub log: Arc<dyn Log>,
    /// Process executor (injectable for testing).
    pub executor: Arc<dyn Executor>,
    /// Filesystem operation abstraction (injectable for testing).
    pub fs_ops: Arc<dyn FileSystemOps>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("session", &self.session)
            .field("config", &self.config)
            .field("platform", &self.platform)
            .field("registry", &self.registry)
            .field("log", &"<dyn Log>")
            .field("executor", &self.executor)
            .field("fs_ops", &self.fs_ops)
            .finish()
    }
}

impl Context {
    /// Create a context backed by the real system and built-in profiles.
    #[must_use]
    pub fn new(
        session: Session,
        config: ToolchainConfig,
        platform: Platform,
        log: Arc<dyn Log>,
    ) -> Self {
        Self {
            session,
            config,
            platform,
            registry: ProfileRegistry::builtin(),
            log,
            executor: Arc::new(SystemExecutor),
            fs_ops: Arc::new(SystemFileSystemOps),
        }
    }

    /// Resolve the project root, open the session and load configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be determined or the config file
    /// is unreadable or malformed.
    pub fn init(global: &GlobalOpts, log: Arc<dyn Log>) -> Result<Self> {
        let root = session::resolve_root(global.root.as_deref())?;
        let session = Session::open(&root)?;
        log.debug(&format!("root: {}", session.root.display()));
        log.debug(&format!("build generation: {}", session.generation));

        let config_path = config::resolve_path(global.config.as_deref(), &session.root);
        let config = ToolchainConfig::load(&config_path)?;
        log.debug(&format!(
            "config: {} (project {})",
            config_path.display(),
            config.project
        ));

        Ok(Self::new(session, config, Platform::detect(), log))
    }

    /// Replace the process executor.
    #[must_use]
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = executor;
        self
    }

    /// Replace the filesystem operations.
    #[must_use]
    pub fn with_fs_ops(mut self, fs_ops: Arc<dyn FileSystemOps>) -> Self {
        self.fs_ops = fs_ops;
        self
    }

    /// Replace the profile registry.
    #[must_use]
    pub fn with_registry(mut self, registry: ProfileRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// The host OS, or `None` after reporting that it is unsupported.
    fn supported_os(&self) -> Option<Os> {
        match self.platform.os() {
            Ok(os) => Some(os),
            Err(e) => {
                self.log.error(&e.to_string());
                self.log.record_step("platform", StepStatus::Skipped, Some(self.platform.name()));
                None
            }
        }
    }
}

/// Run `f` as a named step, recording its status for the summary.
fn step<T>(ctx: &Context, name: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    match f() {
        Ok(value) => {
            ctx.log.record_step(name, StepStatus::Ok, None);
            Ok(value)
        }
        Err(e) => {
            ctx.log.record_step(name, StepStatus::Failed, Some(&format!("{e:#}")));
            Err(e)
        }
    }
}

/// Mirror `data/` and `src/shaders/` into the build directory.
///
/// The two copies are independent; a failure in the second leaves the
/// first in place.
fn mirror_assets(ctx: &Context) -> Result<()> {
    let s = &ctx.session;
    for (name, src, dst) in [
        ("mirror data", &s.data, &s.build_data),
        ("mirror shaders", &s.src_shaders, &s.build_shaders),
    ] {
        let stats = step(ctx, name, || Ok(mirror::sync_directory(src, dst)?))?;
        ctx.log.debug(&format!(
            "{name}: {} files, {} directories",
            stats.files, stats.directories
        ));
    }
    Ok(())
}

/// Run `command` against `ctx`.
///
/// # Errors
///
/// Returns an error if a mirror, snapshot or toolchain step fails, or if
/// `run` finds no executable.  Unknown verbs and unsupported hosts are
/// reported and return `Ok`.
pub fn dispatch(command: &Command, ctx: &Context) -> Result<Outcome> {
    if let Command::Unknown(verb) = command {
        ctx.log.error(&CommandError::Unknown(verb.clone()).to_string());
        return Ok(Outcome::Unrecognized);
    }

    ctx.session.ensure_build_dir()?;

    match command {
        Command::Debug { devenv } => debug::run(ctx, *devenv),
        Command::IfChanged { devenv } => ifchanged::run(ctx, *devenv),
        Command::Release => release::run(ctx),
        Command::Clean => Ok(clean::run(ctx)),
        Command::Run => run::run(ctx),
        Command::Unknown(_) => Ok(Outcome::Unrecognized),
    }
}


#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::test_support::{harness, project};
    use super::*;

    #[test]
    fn unknown_verb_is_reported_without_side_effects() {
        let dir = project();
        let h = harness(dir.path(), Platform::new(Os::Linux));

        let outcome = dispatch(&Command::Unknown("bulid".to_string()), &h.ctx).unwrap();

        assert_eq!(outcome, Outcome::Unrecognized);
        assert!(h.log.contains("Unrecognized argument: bulid"));
        assert!(!dir.path().join("build").exists());
    }

    #[test]
    fn unsupported_platform_is_noop() {
        let dir = project();
        let h = harness(dir.path(), Platform::from_name("freebsd"));

        for command in [
            Command::Debug { devenv: false },
            Command::IfChanged { devenv: false },
            Command::Release,
            Command::Run,
        ] {
            assert_eq!(dispatch(&command, &h.ctx).unwrap(), Outcome::Unsupported);
        }

        assert!(h.log.contains("Unsupported platform: freebsd"));
        assert!(h.exec.runs.lock().unwrap().is_empty());
        assert!(!dir.path().join("build/data").exists());
        assert!(!dir.path().join("build/src_hashes").exists());
    }

    #[test]
    fn dispatch_creates_build_dir() {
        let dir = project();
        let h = harness(dir.path(), Platform::new(Os::Linux));
        dispatch(&Command::Clean, &h.ctx).unwrap();
        assert!(dir.path().join("build").is_dir());
    }

    #[test]
    fn command_names() {
        assert_eq!(Command::IfChanged { devenv: true }.name(), "ifchanged");
        assert_eq!(Command::Unknown("x".into()).name(), "unknown");
    }
}
