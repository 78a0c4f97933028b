//! `ifchanged`: rebuild debug artifacts only when the source tree changed.
use anyhow::Result;

use super::{Context, Outcome, debug, step};
use crate::logging::StepStatus;

/// Compare the source tree against the last snapshot and run `debug` if it
/// differs.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be rotated or the debug build
/// fails.
pub fn run(ctx: &Context, devenv: bool) -> Result<Outcome> {
    if ctx.supported_os().is_none() {
        return Ok(Outcome::Unsupported);
    }

    let store = ctx.session.fingerprints();
    let changed = step(ctx, "compare sources", || Ok(store.rotate_and_compare(&ctx.session.src)?))?;

    if !changed {
        ctx.log.info("No changes. Nothing to compile.");
        ctx.log.record_step("compile debug", StepStatus::Skipped, Some("no changes"));
        return Ok(Outcome::UpToDate);
    }

    debug::run(ctx, devenv)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::commands::test_support::{harness, project};
    use crate::platform::{Os, Platform};

    #[test]
    fn first_run_builds() {
        let dir = project();
        let h = harness(dir.path(), Platform::new(Os::Linux));
        h.ctx.session.ensure_build_dir().unwrap();

        assert_eq!(run(&h.ctx, false).unwrap(), Outcome::Built);
        assert_eq!(h.exec.runs.lock().unwrap().len(), 2);
    }

    #[test]
    fn unchanged_tree_skips_build() {
        let dir = project();
        let h = harness(dir.path(), Platform::new(Os::Linux));
        h.ctx.session.ensure_build_dir().unwrap();

        run(&h.ctx, false).unwrap();
        assert_eq!(run(&h.ctx, false).unwrap(), Outcome::UpToDate);

        assert_eq!(h.exec.runs.lock().unwrap().len(), 2);
        assert!(h.log.contains("No changes. Nothing to compile."));
        assert_eq!(h.log.step_status("compare sources"), Some(StepStatus::Ok));
    }

    #[test]
    fn edited_source_rebuilds() {
        let dir = project();
        let h = harness(dir.path(), Platform::new(Os::Linux));
        h.ctx.session.ensure_build_dir().unwrap();

        run(&h.ctx, false).unwrap();
        run(&h.ctx, false).unwrap();
        // Same length, different bytes.
        std::fs::write(dir.path().join("src/main.cpp"), "int main() {;").unwrap();

        assert_eq!(run(&h.ctx, false).unwrap(), Outcome::Built);
        assert_eq!(h.exec.runs.lock().unwrap().len(), 4);
    }

    #[test]
    fn added_file_rebuilds() {
        let dir = project();
        let h = harness(dir.path(), Platform::new(Os::Linux));
        h.ctx.session.ensure_build_dir().unwrap();

        run(&h.ctx, false).unwrap();
        std::fs::write(dir.path().join("src/util.h"), "#pragma once").unwrap();

        assert_eq!(run(&h.ctx, false).unwrap(), Outcome::Built);
    }

    #[test]
    fn unsupported_platform_leaves_snapshots_alone() {
        let dir = project();
        let h = harness(dir.path(), Platform::from_name("freebsd"));
        h.ctx.session.ensure_build_dir().unwrap();

        assert_eq!(run(&h.ctx, false).unwrap(), Outcome::Unsupported);
        assert!(!h.ctx.session.src_hashes.exists());
        assert!(!h.ctx.session.src_hashes_old.exists());
    }
}
