//! Content fingerprints of a source tree and the two-generation change check.
//!
//! A [`Snapshot`] is the ordered list of `(relative path, SHA-256)` pairs for
//! every regular file under a directory, with file symlinks hashed through
//! to their target.  Snapshots are persisted as
//! alternating path/digest lines so that two generations can be compared
//! byte for byte.
use std::fmt::Write as _;
use std::ffi::OsStr;
use std::fs::File;
use std::io::Read as _;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::error::FileSystemError;

/// Read buffer size used when streaming file content into the hasher.
const CHUNK_SIZE: usize = 4096;

/// One regular file in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    /// Path relative to the tree root, `/`-separated.
    pub path: String,
    /// Lowercase hex SHA-256 of the file content.
    pub digest: String,
}

/// Ordered fingerprint of a directory tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Records in traversal order.
    pub records: Vec<SourceRecord>,
}

impl Snapshot {
    /// Number of files recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the tree held no regular files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serialize as alternating `path` / `digest` lines.
    #[must_use]
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            writeln!(out, "{}", record.path).unwrap_or(());
            writeln!(out, "{}", record.digest).unwrap_or(());
        }
        out
    }

    /// Parse the alternating-lines form produced by [`Snapshot::serialize`].
    ///
    /// Returns `None` if a path line has no digest line after it.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let mut records = Vec::new();
        let mut lines = text.lines();
        while let Some(path) = lines.next() {
            let digest = lines.next()?;
            records.push(SourceRecord {
                path: path.to_string(),
                digest: digest.to_string(),
            });
        }
        Some(Self { records })
    }
}

/// Stream `path` through SHA-256 in bounded chunks.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn digest_file(path: &Path) -> Result<String, FileSystemError> {
    let mut file = File::open(path).map_err(FileSystemError::wrap("opening", path))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = file
            .read(&mut buf)
            .map_err(FileSystemError::wrap("reading", path))?;
        if n == 0 {
            break;
        }
        hasher.update(buf.get(..n).unwrap_or_default());
    }
    let mut hex = String::with_capacity(64);
    for b in hasher.finalize() {
        write!(hex, "{b:02x}").unwrap_or(());
    }
    Ok(hex)
}

/// Walk every regular file under `tree_root` and fingerprint it.
///
/// Entries are visited in file-name order so the result depends only on
/// the tree's names and content, never on timestamps or directory order.
///
/// # Errors
///
/// Returns an error if the root cannot be read or any file cannot be hashed.
pub fn compute_snapshot(tree_root: &Path) -> Result<Snapshot, FileSystemError> {
    let mut records = Vec::new();
    for entry in WalkDir::new(tree_root)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(tree_root).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
            FileSystemError::new("walking", path, source)
        })?;
        // File symlinks are hashed through to their target; directory
        // symlinks are listed but never descended.
        if !entry.path().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(tree_root)
            .unwrap_or_else(|_| entry.path());
        records.push(SourceRecord {
            path: encode_relative(relative),
            digest: digest_file(entry.path())?,
        });
    }
    Ok(Snapshot { records })
}

/// Join the components of `relative` with `/`, escaping anything that would
/// be ambiguous in the line-oriented snapshot form.
///
/// Backslash, newline and carriage return are written as `\\`, `\n` and
/// `\r`; bytes that are not
/// valid UTF-8 are written as `\xNN`, so distinct names never collide.
fn encode_relative(relative: &Path) -> String {
    let mut out = String::new();
    for (i, component) in relative.components().enumerate() {
        if i > 0 {
            out.push('/');
        }
        encode_component(component.as_os_str(), &mut out);
    }
    out
}

fn encode_component(name: &OsStr, out: &mut String) {
    for chunk in name.as_encoded_bytes().utf8_chunks() {
        for c in chunk.valid().chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                _ => out.push(c),
            }
        }
        for b in chunk.invalid() {
            write!(out, "\\x{b:02x}").unwrap_or(());
        }
    }
}

/// Write `snapshot` to `location`, replacing any existing file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn persist(snapshot: &Snapshot, location: &Path) -> Result<(), FileSystemError> {
    std::fs::write(location, snapshot.serialize())
        .map_err(FileSystemError::wrap("writing snapshot", location))
}

/// Read a snapshot from `location`, or `None` if no file exists there.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or is malformed.
pub fn load(location: &Path) -> Result<Option<Snapshot>, FileSystemError> {
    let text = match std::fs::read_to_string(location) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(FileSystemError::new("reading snapshot", location, e)),
    };
    Snapshot::parse(&text).map(Some).ok_or_else(|| {
        FileSystemError::new(
            "parsing snapshot",
            location,
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "path line without a digest line",
            ),
        )
    })
}

/// The `current` / `previous` snapshot pair kept between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationStore {
    current: PathBuf,
    previous: PathBuf,
}

impl GenerationStore {
    /// Create a store persisting to the two given files.
    #[must_use]
    pub fn new(current: impl Into<PathBuf>, previous: impl Into<PathBuf>) -> Self {
        Self {
            current: current.into(),
            previous: previous.into(),
        }
    }

    /// Location of the newest snapshot.
    #[must_use]
    pub fn current(&self) -> &Path {
        &self.current
    }

    /// Location of the snapshot before it.
    #[must_use]
    pub fn previous(&self) -> &Path {
        &self.previous
    }

    /// Fingerprint `tree_root` and overwrite `current` without rotating.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree cannot be hashed or the file written.
    pub fn record(&self, tree_root: &Path) -> Result<Snapshot, FileSystemError> {
        let snapshot = compute_snapshot(tree_root)?;
        persist(&snapshot, &self.current)?;
        Ok(snapshot)
    }

    /// Rotate `current` into `previous`, record a fresh `current`, and
    /// report whether the tree differs from the last run.
    ///
    /// With no `current` on disk the answer is always `true`, even for an
    /// empty tree.
    ///
    /// # Errors
    ///
    /// Returns an error if either snapshot file cannot be moved, written or read.
    pub fn rotate_and_compare(&self, tree_root: &Path) -> Result<bool, FileSystemError> {
        let first_run = !self.current.exists();
        if !first_run {
            if self.previous.exists() {
                std::fs::remove_file(&self.previous)
                    .map_err(FileSystemError::wrap("removing snapshot", &self.previous))?;
            }
            std::fs::rename(&self.current, &self.previous)
                .map_err(FileSystemError::wrap("rotating snapshot", &self.current))?;
        }

        self.record(tree_root)?;

        if first_run {
            return Ok(true);
        }
        self.generations_differ()
    }

    /// Compare the two persisted files: size first, then full content.
    fn generations_differ(&self) -> Result<bool, FileSystemError> {
        let size = |path: &Path| {
            std::fs::metadata(path)
                .map(|m| m.len())
                .map_err(FileSystemError::wrap("reading snapshot", path))
        };
        if size(&self.current)? != size(&self.previous)? {
            return Ok(true);
        }
        let current = std::fs::read(&self.current)
            .map_err(FileSystemError::wrap("reading snapshot", &self.current))?;
        let previous = std::fs::read(&self.previous)
            .map_err(FileSystemError::wrap("reading snapshot", &self.previous))?;
        Ok(current != previous)
    }
}
