//! Host platform detection.
use std::fmt;

use crate::error::PlatformError;

/// Host operating systems that have a toolchain profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Os {
    /// Windows with the MSVC toolchain.
    Windows,
    /// Linux with GCC.
    Linux,
    /// macOS with Clang.
    Mac,
}

impl Os {
    /// Upper-case tag used in environment variable names (`COMPILE_LINUX_...`).
    #[must_use]
    pub const fn env_tag(self) -> &'static str {
        match self {
            Self::Windows => "WINDOWS",
            Self::Linux => "LINUX",
            Self::Mac => "MACOS",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => write!(f, "windows"),
            Self::Linux => write!(f, "linux"),
            Self::Mac => write!(f, "macos"),
        }
    }
}

/// Platform information for the current system.
///
/// Detection never fails; an unrecognised host is carried by name so that
/// commands can report it and return without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    os: Option<Os>,
    name: String,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_name(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` style name to a platform.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let os = match name {
            "windows" => Some(Os::Windows),
            "linux" => Some(Os::Linux),
            "macos" => Some(Os::Mac),
            _ => None,
        };
        Self {
            os,
            name: name.to_string(),
        }
    }

    /// Create a platform with an explicit operating system.
    #[must_use]
    pub fn new(os: Os) -> Self {
        Self {
            os: Some(os),
            name: os.to_string(),
        }
    }

    /// Host name as reported by the standard library.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The supported operating system, or an error naming the host.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Unsupported`] when the host is not one of
    /// Windows, Linux or macOS.
    pub fn os(&self) -> Result<Os, PlatformError> {
        self.os.ok_or_else(|| PlatformError::Unsupported {
            platform: self.name.clone(),
        })
    }

    /// Whether this is a Windows host.
    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.os == Some(Os::Windows)
    }
}
