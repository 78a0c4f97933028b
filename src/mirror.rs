//! Replicate a directory tree into the build output location.
use std::fs::{File, FileTimes};
use std::path::Path;

use crate::error::FileSystemError;

/// Counts of what a [`sync_directory`] call copied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorStats {
    /// Regular files copied.
    pub files: usize,
    /// Directories created below the destination root.
    pub directories: usize,
}

/// Replace `dst` with an exact copy of `src`.
///
/// Any existing `dst` is removed first, so files that no longer exist in
/// `src` do not survive.  File content, permissions and access/modification
/// times are preserved.  Directory symlinks inside `src` are followed and
/// their contents materialised.
///
/// # Errors
///
/// Returns an error if `src` is not a directory, or if any removal, read,
/// copy or timestamp update fails.  A partially written `dst` is left as is.
pub fn sync_directory(src: &Path, dst: &Path) -> Result<MirrorStats, FileSystemError> {
    if !src.is_dir() {
        return Err(FileSystemError::new(
            "mirroring",
            src,
            std::io::Error::new(std::io::ErrorKind::NotFound, "source is not a directory"),
        ));
    }
    if dst.symlink_metadata().is_ok() {
        std::fs::remove_dir_all(dst).map_err(FileSystemError::wrap("removing", dst))?;
    }
    let mut stats = MirrorStats::default();
    copy_tree(src, dst, &mut stats)?;
    Ok(stats)
}

fn copy_tree(src: &Path, dst: &Path, stats: &mut MirrorStats) -> Result<(), FileSystemError> {
    std::fs::create_dir_all(dst).map_err(FileSystemError::wrap("creating directory", dst))?;

    let mut entries = std::fs::read_dir(src)
        .map_err(FileSystemError::wrap("reading directory", src))?
        .map(|e| e.map(|entry| entry.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(FileSystemError::wrap("reading entry in", src))?;
    entries.sort();

    for src_path in entries {
        let Some(name) = src_path.file_name() else {
            continue;
        };
        let dst_path = dst.join(name);
        if src_path.is_dir() {
            stats.directories += 1;
            copy_tree(&src_path, &dst_path, stats)?;
        } else {
            copy_file(&src_path, &dst_path)?;
            stats.files += 1;
        }
    }
    Ok(())
}

/// Copy one file, then carry over its access and modification times.
///
/// [`std::fs::copy`] already preserves permission bits.
fn copy_file(src: &Path, dst: &Path) -> Result<(), FileSystemError> {
    std::fs::copy(src, dst).map_err(FileSystemError::wrap("copying", src))?;

    let meta = std::fs::metadata(src).map_err(FileSystemError::wrap("reading metadata", src))?;
    let mut times = FileTimes::new();
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = meta.modified() {
        times = times.set_modified(modified);
    }
    // Windows needs write access to change times; Unix only needs ownership,
    // which keeps read-only files copyable.
    let file = if cfg!(windows) {
        File::options().write(true).open(dst)
    } else {
        File::open(dst)
    };
    file.and_then(|f| f.set_times(times))
        .map_err(FileSystemError::wrap("setting times on", dst))
}
