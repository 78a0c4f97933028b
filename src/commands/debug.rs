//! `debug`: mirror assets, snapshot sources and build debug artifacts.
use anyhow::Result;

use super::{Context, Outcome, mirror_assets, step};
use crate::exec::Invocation;
use crate::fingerprint::GenerationStore;
use crate::platform::Os;
use crate::toolchain::{self, Configuration};

/// Build debug artifacts unconditionally.
///
/// Any failure discards the newest source snapshot, so the next `ifchanged`
/// builds again instead of reporting no changes.
///
/// # Errors
///
/// Returns an error if mirroring, snapshotting or the toolchain fails.
pub fn run(ctx: &Context, devenv: bool) -> Result<Outcome> {
    let Some(os) = ctx.supported_os() else {
        return Ok(Outcome::Unsupported);
    };
    ctx.log.stage("Building debug");

    let store = ctx.session.fingerprints();
    mirror_snapshot_and_build(ctx, os, &store).inspect_err(|_| {
        if let Err(e) = std::fs::remove_file(store.current())
            && e.kind() != std::io::ErrorKind::NotFound
        {
            ctx.log.debug(&format!(
                "could not discard {}: {e}",
                store.current().display()
            ));
        }
    })?;

    if devenv {
        open_in_devenv(ctx, os);
    }
    Ok(Outcome::Built)
}

fn mirror_snapshot_and_build(ctx: &Context, os: Os, store: &GenerationStore) -> Result<()> {
    mirror_assets(ctx)?;

    let snapshot = step(ctx, "snapshot sources", || Ok(store.record(&ctx.session.src)?))?;
    ctx.log.debug(&format!("recorded {} source files", snapshot.len()));

    build(ctx, os, Configuration::Debug)
}

/// Purge stale symbols and run the toolchain for `configuration`.
pub(super) fn build(ctx: &Context, os: Os, configuration: Configuration) -> Result<()> {
    let profile = ctx.registry.get(os, configuration, &ctx.config)?;

    let purged = toolchain::purge_stale_artifacts(
        ctx.fs_ops.as_ref(),
        &ctx.session.build,
        ".pdb",
        ctx.log.as_ref(),
    );
    if purged.removed + purged.failed > 0 {
        ctx.log.debug(&format!(
            "purged {} symbol files ({} locked)",
            purged.removed, purged.failed
        ));
    }

    step(ctx, &format!("compile {configuration}"), || {
        Ok(toolchain::invoke(
            &profile,
            &ctx.session,
            ctx.executor.as_ref(),
            ctx.log.as_ref(),
        )?)
    })
}

/// Open the built executable in Visual Studio.
fn open_in_devenv(ctx: &Context, os: Os) {
    if !ctx.platform.is_windows() {
        ctx.log.warn("devenv is only available on Windows");
        return;
    }
    let executable = match ctx.registry.get(os, Configuration::Debug, &ctx.config) {
        Ok(profile) => profile.outputs.executable,
        Err(e) => {
            ctx.log.warn(&e.to_string());
            return;
        }
    };
    let invocation = Invocation::new("devenv", "devenv", &ctx.session.build).args([executable]);
    match ctx.executor.launch(&invocation) {
        Ok(0) => {}
        Ok(code) => ctx.log.warn(&format!("devenv exited with code {code}")),
        Err(e) => ctx.log.warn(&e.to_string()),
    }
}
