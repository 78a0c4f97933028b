//! GCC profile for Linux.
use super::{Configuration, Family, Outputs, ProfileBase, ToolchainProfile, strings};
use crate::config::ToolchainConfig;
use crate::platform::Os;

/// Libraries the host executable needs from the system.
const SYSTEM_LIBRARIES: &[&str] = &["m", "dl", "GL", "X11", "asound", "pthread"];

pub(super) fn profile(configuration: Configuration, config: &ToolchainConfig) -> ToolchainProfile {
    let base = ProfileBase {
        os: Os::Linux,
        configuration,
        config,
    };
    let deps = base.third_party();
    let project = base.project();
    ToolchainProfile {
        platform: Os::Linux,
        configuration,
        family: Family::Gnu,
        compiler: "gcc".to_string(),
        macros: base.macros("GAME_LINUX"),
        compiler_flags: gnu_compiler_flags(configuration),
        warning_flags: strings(&["-Werror", "-Wall", "-Wno-char-subscripts"]),
        include_paths: deps.include_paths.clone(),
        link_flags: Vec::new(),
        executable_flags: strings(&["-fvisibility=hidden"]),
        library_paths: deps.library_paths.clone(),
        module_libraries: deps.libraries.clone(),
        executable_libraries: strings(SYSTEM_LIBRARIES),
        outputs: Outputs {
            dynamic_module: format!("{project}_game.so"),
            executable: format!("{project}_linux"),
            debug_symbols: None,
            map_file: None,
        },
        exported_symbols: config.exported_symbols.clone(),
        module_source: config.sources.module.clone(),
        executable_source: config.executable_source(Os::Linux).to_string(),
        environment_script: base.environment_script(),
    }
}

/// Code generation flags shared by the GCC and Clang profiles.
pub(super) fn gnu_compiler_flags(configuration: Configuration) -> Vec<String> {
    let debug_info = match configuration {
        Configuration::Debug => "-ggdb3",
        Configuration::Release => "-O2",
    };
    strings(&["-std=c++11", debug_info, "-fno-rtti", "-fno-exceptions"])
}
