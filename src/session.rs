//! Resolved project layout and build generation for one invocation.
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::error::FileSystemError;
use crate::fingerprint::GenerationStore;

/// Environment variable naming the project root.
pub const ROOT_ENV: &str = "COMPILE_ROOT";

/// File under the build directory holding the last claimed generation.
const GENERATION_FILE: &str = ".generation";

/// Every path a command touches, plus the build generation.
///
/// Constructed once per process and never mutated; the generation claimed
/// when the compiler first runs is the one captured here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Project root.
    pub root: PathBuf,
    /// Build output directory (`<root>/build`).
    pub build: PathBuf,
    /// Asset directory (`<root>/data`).
    pub data: PathBuf,
    /// Source tree (`<root>/src`).
    pub src: PathBuf,
    /// Shader sources (`<root>/src/shaders`).
    pub src_shaders: PathBuf,
    /// Mirrored assets (`<root>/build/data`).
    pub build_data: PathBuf,
    /// Mirrored shaders (`<root>/build/shaders`).
    pub build_shaders: PathBuf,
    /// Newest source snapshot.
    pub src_hashes: PathBuf,
    /// Snapshot before the newest.
    pub src_hashes_old: PathBuf,
    /// Persisted generation counter.
    pub generation_file: PathBuf,
    /// Generation of this build: one past the highest already claimed.
    pub generation: u64,
}

impl Session {
    /// Lay out the project paths under `root` with an explicit generation.
    #[must_use]
    pub fn new(root: &Path, generation: u64) -> Self {
        let build = root.join("build");
        let src = root.join("src");
        Self {
            root: root.to_path_buf(),
            data: root.join("data"),
            src_shaders: src.join("shaders"),
            build_data: build.join("data"),
            build_shaders: build.join("shaders"),
            src_hashes: build.join("src_hashes"),
            src_hashes_old: build.join("src_hashes_old"),
            generation_file: build.join(GENERATION_FILE),
            src,
            build,
            generation,
        }
    }

    /// Canonicalize `root` and read the next generation from disk.
    ///
    /// The next generation is one past the larger of the persisted counter
    /// and the highest number embedded in a `*_game<N>.pdb` left in the build
    /// directory.  A missing or unreadable counter counts as 0.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` does not exist.
    pub fn open(root: &Path) -> Result<Self, FileSystemError> {
        let root = dunce::canonicalize(root).map_err(FileSystemError::wrap("resolving", root))?;
        let build = root.join("build");
        let counter = std::fs::read_to_string(build.join(GENERATION_FILE))
            .ok()
            .and_then(|text| text.trim().parse::<u64>().ok())
            .unwrap_or(0);
        let last = counter.max(highest_symbols_generation(&build));
        Ok(Self::new(&root, last.saturating_add(1)))
    }

    /// The `current`/`previous` snapshot pair for the source tree.
    #[must_use]
    pub fn fingerprints(&self) -> GenerationStore {
        GenerationStore::new(&self.src_hashes, &self.src_hashes_old)
    }

    /// Create the build directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_build_dir(&self) -> Result<(), FileSystemError> {
        std::fs::create_dir_all(&self.build)
            .map_err(FileSystemError::wrap("creating directory", &self.build))
    }

    /// Record this session's generation as the last successful build.
    ///
    /// # Errors
    ///
    /// Returns an error if the counter file cannot be written.
    pub fn persist_generation(&self) -> Result<(), FileSystemError> {
        std::fs::write(&self.generation_file, format!("{}\n", self.generation))
            .map_err(FileSystemError::wrap("writing", &self.generation_file))
    }
}

/// Highest `N` among `*_game<N>.pdb` files directly under `build`.
fn highest_symbols_generation(build: &Path) -> u64 {
    std::fs::read_dir(build)
        .into_iter()
        .flatten()
        .filter_map(Result::ok)
        .filter_map(|entry| symbols_generation(&entry.file_name().to_string_lossy()))
        .max()
        .unwrap_or(0)
}

/// Generation embedded in a module's debug symbols name
/// (`particles_game12.pdb` → 12).
fn symbols_generation(name: &str) -> Option<u64> {
    let stem = name.strip_suffix(".pdb")?;
    let prefix = stem.trim_end_matches(|c: char| c.is_ascii_digit());
    if !prefix.ends_with("_game") {
        return None;
    }
    stem.get(prefix.len()..)?.parse().ok()
}

/// Resolve the project root from CLI arguments or auto-detection.
///
/// Order: explicit `--root`, then `COMPILE_ROOT`, then the location of the
/// running binary, then the current directory if it has a `src/` tree.
///
/// # Errors
///
/// Returns an error if no candidate looks like a project root.
pub fn resolve_root(explicit: Option<&Path>) -> Result<PathBuf> {
    resolve_root_from(
        explicit,
        std::env::var_os(ROOT_ENV).map(PathBuf::from),
        std::env::current_exe().ok(),
        std::env::current_dir().context("reading current directory")?,
    )
}

fn resolve_root_from(
    explicit: Option<&Path>,
    env_root: Option<PathBuf>,
    exe: Option<PathBuf>,
    cwd: PathBuf,
) -> Result<PathBuf> {
    if let Some(root) = explicit {
        return Ok(root.to_path_buf());
    }
    if let Some(root) = env_root {
        return Ok(root);
    }

    if let Some(exe) = exe
        && let Some(parent) = exe.parent()
    {
        let candidates = [
            parent.join(".."),    // build/compile → root
            parent.join("../.."), // target/<profile>/compile → root
        ];
        for candidate in &candidates {
            if candidate.join("src").is_dir() {
                return Ok(dunce::canonicalize(candidate)?);
            }
        }
    }

    if cwd.join("src").is_dir() {
        return Ok(cwd);
    }

    anyhow::bail!("cannot determine project root. Use --root or set {ROOT_ENV}");
}
