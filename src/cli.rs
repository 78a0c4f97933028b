//! Command-line surface: subcommands, legacy bare verbs and global flags.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::Command;

/// Version string, with the git describe output when built from a checkout.
const VERSION: &str = match option_env!("COMPILE_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

/// Top-level CLI entry point for the build orchestrator.
#[derive(Parser, Debug)]
#[command(
    name = "compile",
    about = "Change-detecting build driver for the game module and platform host",
    version = VERSION
)]
pub struct Cli {
    /// Verb to run.
    #[command(subcommand)]
    pub command: Verb,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Root and config overrides.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Override project root directory
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Toolchain config file (default: <root>/compile.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    /// Mirror assets, record a source snapshot and build debug artifacts
    Debug(LaunchOpts),
    /// Build debug artifacts only if the source tree changed since last run
    #[command(name = "ifchanged")]
    IfChanged(LaunchOpts),
    /// Mirror assets and build optimised artifacts
    Release,
    /// Delete everything under the build directory
    Clean,
    /// Launch the built executable
    Run,
    /// Any other verb, reported and ignored
    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

/// Options for the building subcommands that can open a debugger afterwards.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchOpts {
    /// Open the built executable in a debugger (`devenv`, Windows only)
    pub launcher: Option<String>,
}

impl LaunchOpts {
    fn devenv(&self) -> bool {
        self.launcher.as_deref() == Some("devenv")
    }
}

impl Verb {
    /// Map the parsed verb to the command it dispatches.
    #[must_use]
    pub fn to_command(&self) -> Command {
        match self {
            Self::Debug(opts) => Command::Debug {
                devenv: opts.devenv(),
            },
            Self::IfChanged(opts) => Command::IfChanged {
                devenv: opts.devenv(),
            },
            Self::Release => Command::Release,
            Self::Clean => Command::Clean,
            Self::Run => Command::Run,
            Self::Unknown(args) => Command::Unknown(args.first().cloned().unwrap_or_default()),
        }
    }
}
