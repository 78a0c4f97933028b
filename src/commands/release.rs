//! `release`: mirror assets and build optimised artifacts.
use anyhow::Result;

use super::{Context, Outcome, debug, mirror_assets};
use crate::toolchain::Configuration;

/// Build release artifacts.  Source snapshots are left untouched.
///
/// # Errors
///
/// Returns an error if mirroring or the toolchain fails.
pub fn run(ctx: &Context) -> Result<Outcome> {
    let Some(os) = ctx.supported_os() else {
        return Ok(Outcome::Unsupported);
    };
    ctx.log.stage("Building release");

    mirror_assets(ctx)?;
    debug::build(ctx, os, Configuration::Release)?;
    Ok(Outcome::Built)
}
