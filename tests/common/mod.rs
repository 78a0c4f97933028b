// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed project tree, a fluent builder, and
// in-memory stand-ins for the logger and process executor so each
// integration test can drive a command without a native toolchain.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use compile_cli::commands::{self, Command, Context, Outcome};
use compile_cli::config::ToolchainConfig;
use compile_cli::error::ToolchainError;
use compile_cli::exec::{ExecResult, Executor, Invocation};
use compile_cli::logging::{Log, StepEntry, StepStatus};
use compile_cli::platform::Platform;
use compile_cli::session::Session;

/// Write the minimal project layout the commands expect into `root`.
///
/// Creates:
/// - `src/main.cpp`            game module source
/// - `src/linux_main.cpp`      host executable source
/// - `src/shaders/basic.vert`  shader mirrored into `build/shaders`
/// - `data/font.ttf`           asset mirrored into `build/data`
pub fn setup_minimal_project(root: &Path) {
    std::fs::create_dir_all(root.join("src/shaders")).expect("create src dir");
    std::fs::create_dir_all(root.join("data")).expect("create data dir");
    std::fs::write(root.join("src/main.cpp"), "int GameUpdateAndRender() { return 0; }")
        .expect("write main.cpp");
    std::fs::write(root.join("src/linux_main.cpp"), "int main() { return 0; }")
        .expect("write linux_main.cpp");
    std::fs::write(root.join("src/shaders/basic.vert"), "void main() {}")
        .expect("write shader");
    std::fs::write(root.join("data/font.ttf"), "glyphs").expect("write font");
}

/// Log that keeps every message and step in memory.
#[derive(Debug, Default)]
pub struct RecordingLog {
    pub messages: Mutex<Vec<String>>,
    pub steps: Mutex<Vec<StepEntry>>,
}

impl RecordingLog {
    /// Whether any logged message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages
            .lock()
            .expect("messages lock")
            .iter()
            .any(|m| m.contains(needle))
    }

    /// Status of the most recent step named `name`.
    pub fn last_status(&self, name: &str) -> Option<StepStatus> {
        self.steps
            .lock()
            .expect("steps lock")
            .iter()
            .rev()
            .find(|s| s.name == name)
            .map(|s| s.status)
    }

    fn push(&self, msg: &str) {
        self.messages.lock().expect("messages lock").push(msg.to_string());
    }
}

impl Log for RecordingLog {
    fn stage(&self, msg: &str) {
        self.push(msg);
    }
    fn info(&self, msg: &str) {
        self.push(msg);
    }
    fn debug(&self, msg: &str) {
        self.push(msg);
    }
    fn warn(&self, msg: &str) {
        self.push(msg);
    }
    fn error(&self, msg: &str) {
        self.push(msg);
    }
    fn record_step(&self, name: &str, status: StepStatus, message: Option<&str>) {
        self.steps.lock().expect("steps lock").push(StepEntry {
            name: name.to_string(),
            status,
            message: message.map(String::from),
        });
    }
}

/// Executor that records every invocation instead of spawning it.
///
/// Compiles succeed unless their label is listed in `fail_labels`; each
/// launch returns `launch_code`.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    pub runs: Mutex<Vec<Invocation>>,
    pub launches: Mutex<Vec<Invocation>>,
    pub fail_labels: Vec<String>,
    pub launch_code: i32,
}

impl RecordingExecutor {
    /// Labels of every compile invocation so far.
    pub fn run_labels(&self) -> Vec<String> {
        self.runs
            .lock()
            .expect("runs lock")
            .iter()
            .map(|i| i.label.clone())
            .collect()
    }
}

impl Executor for RecordingExecutor {
    fn run(&self, invocation: &Invocation) -> Result<ExecResult, ToolchainError> {
        self.runs.lock().expect("runs lock").push(invocation.clone());
        let failed = self.fail_labels.contains(&invocation.label);
        Ok(ExecResult {
            stdout: String::new(),
            stderr: if failed { "error: simulated".to_string() } else { String::new() },
            success: !failed,
            code: Some(i32::from(failed)),
        })
    }

    fn launch(&self, invocation: &Invocation) -> Result<i32, ToolchainError> {
        self.launches.lock().expect("launches lock").push(invocation.clone());
        Ok(self.launch_code)
    }

    fn which(&self, _program: &str) -> bool {
        true
    }
}

/// An isolated project backed by a [`tempfile::TempDir`], wired to
/// recording doubles.
#[derive(Debug)]
pub struct IntegrationTestContext {
    /// Temporary directory containing the test project.
    pub root: tempfile::TempDir,
    pub platform: Platform,
    pub log: Arc<RecordingLog>,
    pub executor: Arc<RecordingExecutor>,
}

impl IntegrationTestContext {
    /// Path to the project root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Path under `build/`.
    pub fn build_path(&self, relative: &str) -> PathBuf {
        self.root.path().join("build").join(relative)
    }

    /// Open a fresh session (re-reading the generation counter) and run
    /// `command` against it.
    pub fn dispatch(&self, command: &Command) -> anyhow::Result<Outcome> {
        let session = Session::open(self.root.path())?;
        let ctx = Context::new(
            session,
            ToolchainConfig::default(),
            self.platform.clone(),
            self.log.clone(),
        )
        .with_executor(self.executor.clone());
        commands::dispatch(command, &ctx)
    }

    /// Write `content` to `relative` under the project root.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(path, content).expect("write file");
    }
}

/// Fluent builder for [`IntegrationTestContext`].
#[derive(Debug)]
pub struct TestContextBuilder {
    platform: Platform,
    executor: RecordingExecutor,
}

impl TestContextBuilder {
    /// Begin building a Linux context with an always-succeeding executor.
    pub fn new() -> Self {
        Self {
            platform: Platform::new(compile_cli::platform::Os::Linux),
            executor: RecordingExecutor::default(),
        }
    }

    /// Pretend to run on `platform`.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Make the compile producing `label` fail.
    pub fn failing(mut self, label: &str) -> Self {
        self.executor.fail_labels.push(label.to_string());
        self
    }

    /// Exit code returned by launched executables.
    pub fn with_launch_code(mut self, code: i32) -> Self {
        self.executor.launch_code = code;
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        let root = tempfile::tempdir().expect("create temp dir");
        setup_minimal_project(root.path());
        IntegrationTestContext {
            root,
            platform: self.platform,
            log: Arc::new(RecordingLog::default()),
            executor: Arc::new(self.executor),
        }
    }
}
