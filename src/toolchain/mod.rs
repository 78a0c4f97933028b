//! Toolchain profiles: what to pass to which compiler for a given
//! (platform, configuration) pair, and how to run it.
//!
//! A [`ProfileRegistry`] maps each [`Os`] to a constructor producing an
//! immutable [`ToolchainProfile`].  [`plan`] turns a profile into the two
//! process invocations (dynamic module, then host executable) and
//! [`invoke`] runs them through an [`Executor`].
mod linux;
mod macos;
mod plan;
mod windows;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

pub use plan::plan;

use crate::config::ToolchainConfig;
use crate::error::{PlatformError, ToolchainError};
use crate::exec::Executor;
use crate::logging::Log;
use crate::operations::FileSystemOps;
use crate::platform::Os;
use crate::session::Session;

/// Build configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Configuration {
    /// Unoptimised build with debug information and internal checks.
    Debug,
    /// Optimised build.
    Release,
}

impl Configuration {
    /// Upper-case tag used in environment variable names.
    #[must_use]
    pub const fn env_tag(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Release => "RELEASE",
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Release => write!(f, "release"),
        }
    }
}

/// Command-line dialect of a compiler driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// `cl.exe` style (`/D`, `/I`, `/link`).
    Msvc,
    /// GCC style with ELF shared objects.
    Gnu,
    /// Clang on macOS with Mach-O dynamic libraries.
    Apple,
}

/// Artifact names produced in the build directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outputs {
    /// Hot-reloadable module (`.dll`, `.so`, `.dylib`).
    pub dynamic_module: String,
    /// Host executable.
    pub executable: String,
    /// Stem of the per-build debug symbols file, when the toolchain emits one.
    pub debug_symbols: Option<String>,
    /// Linker map file for the executable.
    pub map_file: Option<String>,
}

impl Outputs {
    /// Debug symbols file name for build `generation`.
    ///
    /// The module keeps a stable name so the host can copy and reload it;
    /// the symbols file changes every build so a debugger holding the old
    /// one open never blocks the link.
    #[must_use]
    pub fn debug_symbols_file(&self, generation: u64) -> Option<String> {
        self.debug_symbols
            .as_ref()
            .map(|stem| format!("{stem}{generation}.pdb"))
    }
}

/// Everything needed to build one (platform, configuration) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainProfile {
    /// Target platform.
    pub platform: Os,
    /// Build configuration.
    pub configuration: Configuration,
    /// Command-line dialect.
    pub family: Family,
    /// Compiler driver program.
    pub compiler: String,
    /// Preprocessor definitions, `NAME` or `NAME=VALUE`.
    pub macros: BTreeSet<String>,
    /// Code generation flags.
    pub compiler_flags: Vec<String>,
    /// Warning flags.
    pub warning_flags: Vec<String>,
    /// Header search directories.
    pub include_paths: Vec<PathBuf>,
    /// Linker flags applied to both artifacts.
    pub link_flags: Vec<String>,
    /// Extra flags for the executable only.
    pub executable_flags: Vec<String>,
    /// Library search directories.
    pub library_paths: Vec<PathBuf>,
    /// Libraries linked into the dynamic module.
    pub module_libraries: Vec<String>,
    /// Libraries linked into the executable.
    pub executable_libraries: Vec<String>,
    /// Artifact names.
    pub outputs: Outputs,
    /// Symbols the module exports to the host.
    pub exported_symbols: Vec<String>,
    /// Module translation unit, relative to `src/`.
    pub module_source: String,
    /// Executable translation unit, relative to `src/`.
    pub executable_source: String,
    /// Script run before the compiler to set up its environment.
    pub environment_script: Option<PathBuf>,
}

/// Macro defined only when compiling the host executable.
pub const PLATFORM_CODE_MACRO: &str = "GAME_PLATFORM_CODE";

/// Builds a profile for one platform.
pub type ProfileConstructor = fn(Configuration, &ToolchainConfig) -> ToolchainProfile;

/// Platform to profile-constructor table.
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    constructors: BTreeMap<Os, ProfileConstructor>,
}

impl ProfileRegistry {
    /// Registry with the MSVC, GCC and Clang profiles.
    #[must_use]
    pub fn builtin() -> Self {
        Self::empty()
            .register(Os::Windows, windows::profile)
            .register(Os::Linux, linux::profile)
            .register(Os::Mac, macos::profile)
    }

    /// Registry with no platforms.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add or replace the constructor for `os`.
    #[must_use]
    pub fn register(mut self, os: Os, constructor: ProfileConstructor) -> Self {
        self.constructors.insert(os, constructor);
        self
    }

    /// Build the profile for `os` in `configuration`.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Unsupported`] if nothing is registered for `os`.
    pub fn get(
        &self,
        os: Os,
        configuration: Configuration,
        config: &ToolchainConfig,
    ) -> Result<ToolchainProfile, PlatformError> {
        let constructor = self
            .constructors
            .get(&os)
            .ok_or_else(|| PlatformError::Unsupported {
                platform: os.to_string(),
            })?;
        Ok(constructor(configuration, config))
    }
}

/// Fields shared by every built-in profile, filled from the config.
pub(crate) struct ProfileBase<'a> {
    pub os: Os,
    pub configuration: Configuration,
    pub config: &'a ToolchainConfig,
}

impl ProfileBase<'_> {
    /// Macros common to all platforms, plus `platform_macro`.
    pub(crate) fn macros(&self, platform_macro: &str) -> BTreeSet<String> {
        let slow = match self.configuration {
            Configuration::Debug => "GAME_SLOW=1",
            Configuration::Release => "GAME_SLOW=0",
        };
        ["GAME_INTERNAL=1", slow, platform_macro]
            .into_iter()
            .map(String::from)
            .collect()
    }

    pub(crate) fn third_party(&self) -> &crate::config::ThirdParty {
        self.config.third_party(self.os, self.configuration)
    }

    pub(crate) fn project(&self) -> &str {
        &self.config.project
    }

    pub(crate) fn environment_script(&self) -> Option<PathBuf> {
        self.config.section(self.os).environment_script.clone()
    }
}

pub(crate) fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

/// Files removed and failures skipped by [`purge_stale_artifacts`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeStats {
    /// Files deleted.
    pub removed: usize,
    /// Files that could not be deleted.
    pub failed: usize,
}

/// Delete every entry in `output_dir` whose name ends with `pattern`.
///
/// Failures are logged and skipped: a debugger may still hold an old
/// symbols file open, which must not stop the build.
pub fn purge_stale_artifacts(
    fs_ops: &dyn FileSystemOps,
    output_dir: &Path,
    pattern: &str,
    log: &dyn Log,
) -> PurgeStats {
    let mut stats = PurgeStats::default();
    let entries = match fs_ops.read_dir(output_dir) {
        Ok(entries) => entries,
        Err(e) => {
            log.debug(&format!("cannot list {}: {e}", output_dir.display()));
            return stats;
        }
    };
    for path in entries {
        let matches = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().ends_with(pattern));
        if !matches {
            continue;
        }
        match fs_ops.remove(&path) {
            Ok(()) => {
                log.debug(&format!("removed {}", path.display()));
                stats.removed += 1;
            }
            Err(e) => {
                log.warn(&format!("couldn't remove {}: {e}", path.display()));
                stats.failed += 1;
            }
        }
    }
    stats
}

/// Run the planned invocations for `profile` in order.
///
/// The session's generation is persisted before the first process starts,
/// so a debug symbols name handed to the linker is never handed out again,
/// even when the build fails.
///
/// # Errors
///
/// Returns [`ToolchainError::CompilerNotFound`] if the compiler is not on
/// `PATH` (skipped when an environment script provides it),
/// [`ToolchainError::Spawn`] if a process cannot start, or
/// [`ToolchainError::InvocationFailed`] on the first non-zero exit.
pub fn invoke(
    profile: &ToolchainProfile,
    session: &Session,
    executor: &dyn Executor,
    log: &dyn Log,
) -> Result<(), ToolchainError> {
    if profile.environment_script.is_none() && !executor.which(&profile.compiler) {
        return Err(ToolchainError::CompilerNotFound(profile.compiler.clone()));
    }
    session
        .persist_generation()
        .map_err(ToolchainError::Record)?;

    for invocation in plan(profile, session) {
        log.info(&format!("building {}", invocation.label));
        log.debug(&invocation.command_line());
        let result = executor.run(&invocation)?;
        for line in result.stdout.lines().filter(|l| !l.trim().is_empty()) {
            log.debug(line);
        }
        if !result.success {
            return Err(ToolchainError::InvocationFailed {
                label: invocation.label,
                code: result.code.unwrap_or(-1),
                output: result.evidence(),
            });
        }
    }
    Ok(())
}
