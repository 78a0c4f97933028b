//! Filesystem operation abstractions for dependency injection.
//!
//! Provides the [`FileSystemOps`] trait so that the log-and-continue removal
//! loops (`clean`, stale artifact purge) can be unit-tested with entries that
//! refuse to be deleted.  Production code uses [`SystemFileSystemOps`];
//! tests use `MockFileSystemOps`.

use std::path::{Path, PathBuf};

/// Abstraction over the filesystem queries and removals used by `clean`
/// and artifact purging.
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Returns `true` if `path` exists on the filesystem.
    fn exists(&self, path: &Path) -> bool;

    /// Returns the immediate child paths inside `path`, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` cannot be opened or read as a directory.
    fn read_dir(&self, path: &Path) -> std::io::Result<Vec<PathBuf>>;

    /// Remove the file, symlink or whole directory tree at `path`.
    ///
    /// Symlinks are removed without touching their target.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails (e.g. the file is locked by a
    /// running process).
    fn remove(&self, path: &Path) -> std::io::Result<()>;
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_dir(&self, path: &Path) -> std::io::Result<Vec<PathBuf>> {
        let mut entries = std::fs::read_dir(path)?
            .map(|e| e.map(|entry| entry.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();
        Ok(entries)
    }

    fn remove(&self, path: &Path) -> std::io::Result<()> {
        let meta = std::fs::symlink_metadata(path)?;
        if meta.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        }
    }
}

/// Mock [`FileSystemOps`] for unit tests.
///
/// Pre-configure directory listings and paths whose removal should fail,
/// then inspect which paths were removed.
///
/// # Example
///
/// ```ignore
/// use compile_cli::operations::MockFileSystemOps;
/// use std::path::PathBuf;
///
/// let fs = MockFileSystemOps::new()
///     .with_dir_entries("/proj/build", vec![PathBuf::from("/proj/build/game.pdb")])
///     .with_locked("/proj/build/game.pdb");
/// ```
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFileSystemOps {
    dirs: std::collections::HashMap<PathBuf, Vec<PathBuf>>,
    locked: std::collections::HashSet<PathBuf>,
    removed: std::sync::Mutex<Vec<PathBuf>>,
}

#[cfg(test)]
impl MockFileSystemOps {
    /// Create an empty mock with nothing configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory entries returned by [`FileSystemOps::read_dir`] for `dir`.
    #[must_use]
    pub fn with_dir_entries(mut self, dir: impl Into<PathBuf>, entries: Vec<PathBuf>) -> Self {
        self.dirs.insert(dir.into(), entries);
        self
    }

    /// Make [`FileSystemOps::remove`] fail for `path`, as if it were locked.
    #[must_use]
    pub fn with_locked(mut self, path: impl Into<PathBuf>) -> Self {
        self.locked.insert(path.into());
        self
    }

    /// Paths successfully removed so far, in call order.
    #[must_use]
    pub fn removed(&self) -> Vec<PathBuf> {
        self.removed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
impl FileSystemOps for MockFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        let removed = self.removed();
        !removed.iter().any(|p| p == path)
            && (self.dirs.contains_key(path) || self.dirs.values().flatten().any(|p| p == path))
    }

    fn read_dir(&self, path: &Path) -> std::io::Result<Vec<PathBuf>> {
        self.dirs
            .get(path)
            .cloned()
            .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))
    }

    fn remove(&self, path: &Path) -> std::io::Result<()> {
        if self.locked.contains(path) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "file is in use by another process",
            ));
        }
        self.removed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(path.to_path_buf());
        Ok(())
    }
}
