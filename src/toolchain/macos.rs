//! Clang profile for macOS.
use super::linux::gnu_compiler_flags;
use super::{Configuration, Family, Outputs, ProfileBase, ToolchainProfile, strings};
use crate::config::ToolchainConfig;
use crate::platform::Os;

pub(super) fn profile(configuration: Configuration, config: &ToolchainConfig) -> ToolchainProfile {
    let base = ProfileBase {
        os: Os::Mac,
        configuration,
        config,
    };
    let deps = base.third_party();
    let project = base.project();
    ToolchainProfile {
        platform: Os::Mac,
        configuration,
        family: Family::Apple,
        compiler: "clang++".to_string(),
        macros: base.macros("GAME_MACOS"),
        compiler_flags: gnu_compiler_flags(configuration),
        warning_flags: strings(&["-Werror", "-Wall", "-Wno-missing-braces"]),
        include_paths: deps.include_paths.clone(),
        link_flags: Vec::new(),
        executable_flags: strings(&["-framework", "OpenGL"]),
        library_paths: deps.library_paths.clone(),
        module_libraries: deps.libraries.clone(),
        executable_libraries: deps.libraries.clone(),
        outputs: Outputs {
            dynamic_module: format!("{project}_game.dylib"),
            executable: format!("{project}_macos"),
            debug_symbols: None,
            map_file: None,
        },
        exported_symbols: config.exported_symbols.clone(),
        module_source: config.sources.module.clone(),
        executable_source: config.executable_source(Os::Mac).to_string(),
        environment_script: base.environment_script(),
    }
}
