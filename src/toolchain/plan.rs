//! Turn a [`ToolchainProfile`] into concrete process invocations.
use super::{Family, PLATFORM_CODE_MACRO, ToolchainProfile};
use crate::exec::Invocation;
use crate::session::Session;

/// Assemble the dynamic module invocation followed by the executable
/// invocation.  Both run from the build directory.
#[must_use]
pub fn plan(profile: &ToolchainProfile, session: &Session) -> Vec<Invocation> {
    let (module, executable) = match profile.family {
        Family::Msvc => (msvc_module(profile, session), msvc_executable(profile, session)),
        Family::Gnu | Family::Apple => (
            gnu_module(profile, session),
            gnu_executable(profile, session),
        ),
    };
    [
        (profile.outputs.dynamic_module.clone(), module),
        (profile.outputs.executable.clone(), executable),
    ]
    .into_iter()
    .map(|(label, args)| wrap(profile, session, label, args))
    .collect()
}

/// Run through `cmd /C call <script> x64 && ...` when the compiler needs
/// an environment script, otherwise call it directly.
fn wrap(
    profile: &ToolchainProfile,
    session: &Session,
    label: String,
    args: Vec<String>,
) -> Invocation {
    match &profile.environment_script {
        Some(script) => Invocation::new(label, "cmd", &session.build)
            .args([
                "/C".to_string(),
                "call".to_string(),
                script.display().to_string(),
                "x64".to_string(),
                "&&".to_string(),
                profile.compiler.clone(),
            ])
            .args(args),
        None => Invocation::new(label, profile.compiler.as_str(), &session.build).args(args),
    }
}

fn source(session: &Session, name: &str) -> String {
    session.src.join(name).display().to_string()
}

/// Macros, code generation, warnings and include paths, in that order.
fn compile_args(
    profile: &ToolchainProfile,
    define: &str,
    include: &str,
    extra_macro: Option<&str>,
) -> Vec<String> {
    let mut args: Vec<String> = extra_macro
        .into_iter()
        .chain(profile.macros.iter().map(String::as_str))
        .map(|m| format!("{define}{m}"))
        .collect();
    args.extend(profile.compiler_flags.iter().cloned());
    args.extend(profile.warning_flags.iter().cloned());
    args.extend(
        profile
            .include_paths
            .iter()
            .map(|p| format!("{include}{}", p.display())),
    );
    args
}

fn msvc_link_args(profile: &ToolchainProfile, libraries: &[String]) -> Vec<String> {
    let mut args = vec!["/link".to_string()];
    args.extend(profile.link_flags.iter().cloned());
    args.extend(
        profile
            .library_paths
            .iter()
            .map(|p| format!("/LIBPATH:{}", p.display())),
    );
    args.extend(libraries.iter().cloned());
    args
}

fn msvc_module(profile: &ToolchainProfile, session: &Session) -> Vec<String> {
    let mut args = compile_args(profile, "/D", "/I", None);
    args.push("/LD".to_string());
    args.push(format!("/Fe{}", profile.outputs.dynamic_module));
    args.push(source(session, &profile.module_source));
    args.extend(msvc_link_args(profile, &profile.module_libraries));
    args.extend(profile.exported_symbols.iter().map(|s| format!("/EXPORT:{s}")));
    if let Some(pdb) = profile.outputs.debug_symbols_file(session.generation) {
        args.push(format!("/PDB:{pdb}"));
    }
    args
}

fn msvc_executable(profile: &ToolchainProfile, session: &Session) -> Vec<String> {
    let mut args = compile_args(profile, "/D", "/I", Some(PLATFORM_CODE_MACRO));
    args.extend(profile.executable_flags.iter().cloned());
    args.push(format!("/Fe{}", profile.outputs.executable));
    if let Some(map) = &profile.outputs.map_file {
        args.push(format!("/Fm{map}"));
    }
    args.push(source(session, &profile.executable_source));
    args.extend(msvc_link_args(profile, &profile.executable_libraries));
    args
}

fn gnu_link_args(profile: &ToolchainProfile, libraries: &[String]) -> Vec<String> {
    let mut args = profile.link_flags.clone();
    args.extend(
        profile
            .library_paths
            .iter()
            .map(|p| format!("-L{}", p.display())),
    );
    args.extend(libraries.iter().map(|l| format!("-l{l}")));
    args
}

fn gnu_module(profile: &ToolchainProfile, session: &Session) -> Vec<String> {
    let mut args = compile_args(profile, "-D", "-I", None);
    if profile.family == Family::Apple {
        args.push("-dynamiclib".to_string());
        args.push("-fPIC".to_string());
        args.extend(
            profile
                .exported_symbols
                .iter()
                .map(|s| format!("-Wl,-exported_symbol,_{s}")),
        );
    } else {
        args.push("-shared".to_string());
        args.push("-fPIC".to_string());
        args.extend(
            profile
                .exported_symbols
                .iter()
                .map(|s| format!("-Wl,--export-dynamic-symbol={s}")),
        );
    }
    args.push(source(session, &profile.module_source));
    args.push("-o".to_string());
    args.push(profile.outputs.dynamic_module.clone());
    args.extend(gnu_link_args(profile, &profile.module_libraries));
    args
}

fn gnu_executable(profile: &ToolchainProfile, session: &Session) -> Vec<String> {
    let mut args = compile_args(profile, "-D", "-I", Some(PLATFORM_CODE_MACRO));
    args.push(source(session, &profile.executable_source));
    args.push("-o".to_string());
    args.push(profile.outputs.executable.clone());
    args.extend(profile.executable_flags.iter().cloned());
    args.extend(gnu_link_args(profile, &profile.executable_libraries));
    args
}
