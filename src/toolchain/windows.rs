//! MSVC (`cl.exe`) profile.
use super::{Configuration, Family, Outputs, ProfileBase, ToolchainProfile, strings};
use crate::config::ToolchainConfig;
use crate::platform::Os;

const WARNING_FLAGS: &[&str] = &[
    "/WX",     // warnings are errors
    "/W4",     // level 4
    "/wd4100", // unused function arguments
    "/wd4189", // unused initialized local variable
    "/wd4201", // nameless struct/union
    "/wd4505", // unreferenced local function removed
];

const SYSTEM_LIBRARIES: &[&str] = &["user32.lib", "gdi32.lib", "opengl32.lib"];

pub(super) fn profile(configuration: Configuration, config: &ToolchainConfig) -> ToolchainProfile {
    let base = ProfileBase {
        os: Os::Windows,
        configuration,
        config,
    };
    let mut macros = base.macros("GAME_WIN32");
    macros.insert("_CRT_SECURE_NO_WARNINGS".to_string());

    let compiler_flags = match configuration {
        Configuration::Debug => strings(&[
            "/MTd", "/nologo", "/Gm-", "/GR-", "/EHa-", "/EHsc", "/Od", "/Oi", "/Z7",
        ]),
        Configuration::Release => strings(&[
            "/MT", "/nologo", "/Gm-", "/GR-", "/EHa-", "/EHsc", "/Ox", "/Z7",
        ]),
    };

    let deps = base.third_party();
    let mut libraries = strings(SYSTEM_LIBRARIES);
    libraries.extend(deps.libraries.iter().cloned());

    let project = base.project();
    ToolchainProfile {
        platform: Os::Windows,
        configuration,
        family: Family::Msvc,
        compiler: "cl".to_string(),
        macros,
        compiler_flags,
        warning_flags: strings(WARNING_FLAGS),
        include_paths: deps.include_paths.clone(),
        link_flags: strings(&["/incremental:no", "/opt:ref"]),
        executable_flags: Vec::new(),
        library_paths: deps.library_paths.clone(),
        module_libraries: libraries.clone(),
        executable_libraries: libraries,
        outputs: Outputs {
            dynamic_module: format!("{project}_game.dll"),
            executable: format!("{project}_win32.exe"),
            debug_symbols: Some(format!("{project}_game")),
            map_file: Some(format!("{project}_win32.map")),
        },
        exported_symbols: config.exported_symbols.clone(),
        module_source: config.sources.module.clone(),
        executable_source: config.executable_source(Os::Windows).to_string(),
        environment_script: base.environment_script(),
    }
}
