//! `run`: launch the built executable.
use anyhow::Result;

use super::{Context, Outcome};
use crate::error::CommandError;
use crate::exec::Invocation;
use crate::logging::StepStatus;
use crate::toolchain::Configuration;

/// Launch the debug executable from the build directory with inherited
/// stdio, blocking until it exits.
///
/// A non-zero exit from the child is reported but is not an error.
///
/// # Errors
///
/// Returns [`CommandError::ExecutableMissing`] if nothing has been built, or
/// a spawn error if the process cannot start.
pub fn run(ctx: &Context) -> Result<Outcome> {
    let Some(os) = ctx.supported_os() else {
        return Ok(Outcome::Unsupported);
    };

    let profile = ctx.registry.get(os, Configuration::Debug, &ctx.config)?;
    let executable = ctx.session.build.join(&profile.outputs.executable);
    if !ctx.fs_ops.exists(&executable) {
        ctx.log.record_step("run", StepStatus::Failed, Some("not built"));
        return Err(CommandError::ExecutableMissing(executable).into());
    }

    ctx.log.stage(&format!("Running {}", profile.outputs.executable));
    let program = executable.to_string_lossy().into_owned();
    let invocation = Invocation::new(&profile.outputs.executable, program, &ctx.session.build);
    let code = ctx.executor.launch(&invocation)?;

    if code == 0 {
        ctx.log.record_step("run", StepStatus::Ok, None);
    } else {
        ctx.log.warn(&format!("{} exited with code {code}", profile.outputs.executable));
        ctx.log.record_step("run", StepStatus::Ok, Some(&format!("exit {code}")));
    }
    Ok(Outcome::Launched(code))
}
