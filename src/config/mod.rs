//! Toolchain configuration: project naming, source files and the
//! machine-specific third-party include/library locations.
//!
//! Loaded from `compile.toml` at the project root.  Every field has a
//! default, so a project without the file still builds with the stock
//! layout.  File values are laid over the defaults one field at a time:
//! a `[windows]` table that only names `environment_script` keeps the
//! stock Windows libraries.  Per-platform lists can be replaced from the environment with
//! `COMPILE_<OS>_<CONFIG>_INCLUDE_PATHS`, `..._LIBRARY_PATHS` and
//! `..._LIBRARIES`.
pub mod toml_loader;

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::platform::Os;
use crate::toolchain::Configuration;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "COMPILE_CONFIG";

/// Config file looked up at the project root.
pub const CONFIG_FILE: &str = "compile.toml";

/// Top-level contents of `compile.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ConfigFile")]
pub struct ToolchainConfig {
    /// Prefix of every produced artifact (`<project>_game.dll`, ...).
    pub project: String,
    /// Symbols the dynamic module must export to the host.
    pub exported_symbols: Vec<String>,
    /// Translation units, relative to `src/`.
    pub sources: Sources,
    /// Windows settings.
    pub windows: PlatformSection,
    /// Linux settings.
    pub linux: PlatformSection,
    /// macOS settings.
    pub macos: PlatformSection,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            project: "particles".to_string(),
            exported_symbols: vec!["GameUpdateAndRender".to_string()],
            sources: Sources::default(),
            windows: PlatformSection {
                environment_script: None,
                debug: ThirdParty::libraries(&["freetype281MTd.lib", "libpng16.lib", "zlib.lib"]),
                release: ThirdParty::libraries(&["freetype281MT.lib", "libpng16.lib", "zlib.lib"]),
            },
            linux: PlatformSection::shared(ThirdParty {
                include_paths: vec![
                    PathBuf::from("/usr/local/include/freetype2"),
                    PathBuf::from("/usr/local/include/libpng16"),
                ],
                library_paths: Vec::new(),
                libraries: vec!["freetype".to_string(), "png16".to_string()],
            }),
            macos: PlatformSection::shared(ThirdParty::libraries(&["freetype", "png"])),
        }
    }
}

/// Source file names, relative to the `src/` directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Sources {
    /// Hot-reloadable game module.
    pub module: String,
    /// Windows host executable.
    pub windows: String,
    /// Linux host executable.
    pub linux: String,
    /// macOS host executable.
    pub macos: String,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            module: "main.cpp".to_string(),
            windows: "win32_main.cpp".to_string(),
            linux: "linux_main.cpp".to_string(),
            macos: "macos_main.cpp".to_string(),
        }
    }
}

/// Settings for one host platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformSection {
    /// Script that puts the compiler on `PATH` (e.g. `vcvarsall.bat`).
    pub environment_script: Option<PathBuf>,
    /// Third-party dependencies for debug builds.
    pub debug: ThirdParty,
    /// Third-party dependencies for release builds.
    pub release: ThirdParty,
}

impl PlatformSection {
    fn shared(deps: ThirdParty) -> Self {
        Self {
            environment_script: None,
            debug: deps.clone(),
            release: deps,
        }
    }
}

/// Third-party include paths, library paths and libraries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThirdParty {
    /// Header search directories.
    pub include_paths: Vec<PathBuf>,
    /// Library search directories.
    pub library_paths: Vec<PathBuf>,
    /// Library names as the linker expects them (`zlib.lib`, `png16`).
    pub libraries: Vec<String>,
}

impl ThirdParty {
    fn libraries(names: &[&str]) -> Self {
        Self {
            libraries: names.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }
}

/// `compile.toml` as written; absent keys keep their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    project: Option<String>,
    exported_symbols: Option<Vec<String>>,
    sources: Option<Sources>,
    windows: PlatformFile,
    linux: PlatformFile,
    macos: PlatformFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PlatformFile {
    environment_script: Option<PathBuf>,
    debug: ThirdPartyFile,
    release: ThirdPartyFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ThirdPartyFile {
    include_paths: Option<Vec<PathBuf>>,
    library_paths: Option<Vec<PathBuf>>,
    libraries: Option<Vec<String>>,
}

impl From<ConfigFile> for ToolchainConfig {
    fn from(file: ConfigFile) -> Self {
        let mut config = Self::default();
        if let Some(project) = file.project {
            config.project = project;
        }
        if let Some(symbols) = file.exported_symbols {
            config.exported_symbols = symbols;
        }
        if let Some(sources) = file.sources {
            config.sources = sources;
        }
        file.windows.apply(&mut config.windows);
        file.linux.apply(&mut config.linux);
        file.macos.apply(&mut config.macos);
        config
    }
}

impl PlatformFile {
    fn apply(self, section: &mut PlatformSection) {
        if let Some(script) = self.environment_script {
            section.environment_script = Some(script);
        }
        self.debug.apply(&mut section.debug);
        self.release.apply(&mut section.release);
    }
}

impl ThirdPartyFile {
    fn apply(self, deps: &mut ThirdParty) {
        if let Some(paths) = self.include_paths {
            deps.include_paths = paths;
        }
        if let Some(paths) = self.library_paths {
            deps.library_paths = paths;
        }
        if let Some(libraries) = self.libraries {
            deps.libraries = libraries;
        }
    }
}

impl ToolchainConfig {
    /// Load the config file at `path` and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml_loader::load_config(path)?;
        Ok(config.with_env_overrides(|key| std::env::var_os(key)))
    }

    /// Settings for `os`.
    #[must_use]
    pub const fn section(&self, os: Os) -> &PlatformSection {
        match os {
            Os::Windows => &self.windows,
            Os::Linux => &self.linux,
            Os::Mac => &self.macos,
        }
    }

    /// Third-party dependencies for one (platform, configuration) pair.
    #[must_use]
    pub const fn third_party(&self, os: Os, configuration: Configuration) -> &ThirdParty {
        let section = self.section(os);
        match configuration {
            Configuration::Debug => &section.debug,
            Configuration::Release => &section.release,
        }
    }

    /// Host executable source for `os`.
    #[must_use]
    pub fn executable_source(&self, os: Os) -> &str {
        match os {
            Os::Windows => &self.sources.windows,
            Os::Linux => &self.sources.linux,
            Os::Mac => &self.sources.macos,
        }
    }

    /// Replace third-party lists with any values found through `lookup`.
    ///
    /// Path lists use the platform's `PATH` syntax; libraries are
    /// comma-separated.  Empty entries are dropped.
    #[must_use]
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<std::ffi::OsString>,
    ) -> Self {
        for os in [Os::Windows, Os::Linux, Os::Mac] {
            for configuration in [Configuration::Debug, Configuration::Release] {
                let prefix = format!("COMPILE_{}_{}", os.env_tag(), configuration.env_tag());
                let section = match os {
                    Os::Windows => &mut self.windows,
                    Os::Linux => &mut self.linux,
                    Os::Mac => &mut self.macos,
                };
                let deps = match configuration {
                    Configuration::Debug => &mut section.debug,
                    Configuration::Release => &mut section.release,
                };
                if let Some(value) = lookup(&format!("{prefix}_INCLUDE_PATHS")) {
                    deps.include_paths = split_paths(&value);
                }
                if let Some(value) = lookup(&format!("{prefix}_LIBRARY_PATHS")) {
                    deps.library_paths = split_paths(&value);
                }
                if let Some(value) = lookup(&format!("{prefix}_LIBRARIES")) {
                    deps.libraries = value
                        .to_string_lossy()
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(ToString::to_string)
                        .collect();
                }
            }
        }
        self
    }
}

fn split_paths(value: &std::ffi::OsStr) -> Vec<PathBuf> {
    std::env::split_paths(value)
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}

/// Locate the config file: `--config`, then `COMPILE_CONFIG`, then
/// `compile.toml` under `root`.
#[must_use]
pub fn resolve_path(explicit: Option<&Path>, root: &Path) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        .unwrap_or_else(|| root.join(CONFIG_FILE))
}
