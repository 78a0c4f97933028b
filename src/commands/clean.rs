//! `clean`: delete everything under the build directory.
use super::{Context, Outcome};
use crate::logging::StepStatus;

/// Remove every entry of the build directory, keeping the directory itself.
///
/// Entries that cannot be removed (typically an executable or symbols file
/// still held open by a debugger) are reported and skipped.
pub fn run(ctx: &Context) -> Outcome {
    ctx.log.stage("Cleaning build directory");
    let build = &ctx.session.build;

    let entries = match ctx.fs_ops.read_dir(build) {
        Ok(entries) => entries,
        Err(e) => {
            ctx.log.debug(&format!("cannot list {}: {e}", build.display()));
            Vec::new()
        }
    };

    let mut removed = 0;
    let mut failed = 0;
    for path in entries {
        match ctx.fs_ops.remove(&path) {
            Ok(()) => {
                ctx.log.debug(&format!("removed {}", path.display()));
                removed += 1;
            }
            Err(e) => {
                ctx.log.warn(&format!("Couldn't remove {}: {e}", path.display()));
                failed += 1;
            }
        }
    }

    let status = if failed == 0 {
        StepStatus::Ok
    } else {
        StepStatus::Failed
    };
    let message = format!("{removed} removed, {failed} skipped");
    ctx.log.record_step("clean", status, Some(&message));
    Outcome::Cleaned { removed, failed }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::commands::test_support::{harness, project};
    use crate::operations::MockFileSystemOps;
    use crate::platform::{Os, Platform};

    #[test]
    fn removes_everything_under_build() {
        let dir = project();
        let build = dir.path().join("build");
        std::fs::create_dir_all(build.join("data/fonts")).unwrap();
        std::fs::write(build.join("data/fonts/a.ttf"), "a").unwrap();
        std::fs::write(build.join("particles_game.so"), "elf").unwrap();
        std::fs::write(build.join("src_hashes"), "x").unwrap();
        let h = harness(dir.path(), Platform::new(Os::Linux));

        let outcome = run(&h.ctx);

        assert_eq!(outcome, Outcome::Cleaned { removed: 3, failed: 0 });
        assert!(build.is_dir());
        assert_eq!(std::fs::read_dir(&build).unwrap().count(), 0);
        assert_eq!(h.log.step_status("clean"), Some(StepStatus::Ok));
    }


    #[test]
    fn locked_entries_are_skipped() {
        let build = std::path::PathBuf::from("/proj/build");
        let fs_ops = Arc::new(
            MockFileSystemOps::new()
                .with_dir_entries(
                    &build,
                    vec![
                        build.join("particles_game.dll"),
                        build.join("particles_game3.pdb"),
                        build.join("particles_win32.exe"),
                    ],
                )
                .with_locked(build.join("particles_game3.pdb")),
        );
        let dir = project();
        let mut h = harness(dir.path(), Platform::new(Os::Windows));
        h.ctx.session = crate::session::Session::new(std::path::Path::new("/proj"), 1);
        h.ctx = h.ctx.with_fs_ops(fs_ops.clone());

        let outcome = run(&h.ctx);

        assert_eq!(outcome, Outcome::Cleaned { removed: 2, failed: 1 });
        assert_eq!(
            fs_ops.removed(),
            [build.join("particles_game.dll"), build.join("particles_win32.exe")]
        );
        assert!(h.log.contains("Couldn't remove"));
        assert!(h.log.contains("particles_game3.pdb"));
        assert_eq!(h.log.step_status("clean"), Some(StepStatus::Failed));
    }

    #[test]
    fn missing_build_dir_is_noop() {
        let dir = project();
        let h = harness(dir.path(), Platform::new(Os::Linux));

        assert_eq!(run(&h.ctx), Outcome::Cleaned { removed: 0, failed: 0 });
    }
}
