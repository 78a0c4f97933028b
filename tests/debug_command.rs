#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the `debug` command.

mod common;

use common::TestContextBuilder;
use compile_cli::commands::{Command, Outcome};
use compile_cli::fingerprint;
use compile_cli::platform::{Os, Platform};

const DEBUG: Command = Command::Debug { devenv: false };

// ---------------------------------------------------------------------------
// Build directory contents
// ---------------------------------------------------------------------------

#[test]
fn mirrors_assets_into_build() {
    let ctx = TestContextBuilder::new().build();
    ctx.write("data/levels/one.txt", "spawn 0 0");

    assert_eq!(ctx.dispatch(&DEBUG).unwrap(), Outcome::Built);

    assert_eq!(
        std::fs::read_to_string(ctx.build_path("data/levels/one.txt")).unwrap(),
        "spawn 0 0"
    );
    assert!(ctx.build_path("data/font.ttf").is_file());
    assert!(ctx.build_path("shaders/basic.vert").is_file());
}

#[test]
fn stale_mirrored_files_are_removed() {
    let ctx = TestContextBuilder::new().build();
    ctx.dispatch(&DEBUG).unwrap();

    std::fs::remove_file(ctx.root_path().join("data/font.ttf")).unwrap();
    ctx.dispatch(&DEBUG).unwrap();

    assert!(!ctx.build_path("data/font.ttf").exists());
}

#[test]
fn records_snapshot_of_source_tree() {
    let ctx = TestContextBuilder::new().build();

    ctx.dispatch(&DEBUG).unwrap();

    let snapshot = fingerprint::load(&ctx.build_path("src_hashes"))
        .unwrap()
        .expect("snapshot written");
    let paths: Vec<_> = snapshot.records.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, ["linux_main.cpp", "main.cpp", "shaders/basic.vert"]);
}

// ---------------------------------------------------------------------------
// Toolchain invocations
// ---------------------------------------------------------------------------

#[test]
fn builds_module_then_executable_in_build_dir() {
    let ctx = TestContextBuilder::new().build();

    ctx.dispatch(&DEBUG).unwrap();

    let runs = ctx.executor.runs.lock().unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].label, "particles_game.so");
    assert_eq!(runs[1].label, "particles_linux");
    let build = dunce::canonicalize(ctx.root_path()).unwrap().join("build");
    assert!(runs.iter().all(|r| r.cwd == build));
}

#[test]
fn windows_symbols_name_advances_each_build() {
    let ctx = TestContextBuilder::new()
        .with_platform(Platform::new(Os::Windows))
        .build();

    ctx.dispatch(&DEBUG).unwrap();
    ctx.dispatch(&DEBUG).unwrap();

    let runs = ctx.executor.runs.lock().unwrap();
    let pdb_args: Vec<_> = runs
        .iter()
        .filter(|r| r.label == "particles_game.dll")
        .flat_map(|r| r.args.iter().filter(|a| a.starts_with("/PDB:")))
        .cloned()
        .collect();
    assert_eq!(pdb_args, ["/PDB:particles_game1.pdb", "/PDB:particles_game2.pdb"]);
}

#[test]
fn failed_compile_is_error_and_claims_generation() {
    let ctx = TestContextBuilder::new().failing("particles_game.so").build();

    let err = ctx.dispatch(&DEBUG).unwrap_err();

    assert!(format!("{err:#}").contains("particles_game.so failed (exit 1)"));
    assert_eq!(
        std::fs::read_to_string(ctx.build_path(".generation")).unwrap().trim(),
        "1"
    );
    assert_eq!(ctx.executor.run_labels(), ["particles_game.so"]);
}

fn module_pdb_args(ctx: &common::IntegrationTestContext) -> Vec<String> {
    ctx.executor
        .runs
        .lock()
        .unwrap()
        .iter()
        .filter(|r| r.label == "particles_game.dll")
        .flat_map(|r| r.args.iter().filter(|a| a.starts_with("/PDB:")))
        .cloned()
        .collect()
}

/// A module linked before the executable failed still wrote its symbols,
/// so the retry must not reuse that name.
#[test]
fn symbols_name_advances_after_failed_build() {
    let ctx = TestContextBuilder::new()
        .with_platform(Platform::new(Os::Windows))
        .failing("particles_win32.exe")
        .build();

    assert!(ctx.dispatch(&DEBUG).is_err());
    assert!(ctx.dispatch(&DEBUG).is_err());

    assert_eq!(
        module_pdb_args(&ctx),
        ["/PDB:particles_game1.pdb", "/PDB:particles_game2.pdb"]
    );
}

/// A symbols file held open by a debugger survives `clean`; the counter is
/// gone but the name must still not be reused.
#[test]
fn symbols_name_skips_file_left_by_clean() {
    let ctx = TestContextBuilder::new()
        .with_platform(Platform::new(Os::Windows))
        .build();

    ctx.dispatch(&DEBUG).unwrap();
    ctx.dispatch(&Command::Clean).unwrap();
    ctx.write("build/particles_game1.pdb", "locked");
    ctx.dispatch(&DEBUG).unwrap();

    assert_eq!(
        module_pdb_args(&ctx),
        ["/PDB:particles_game1.pdb", "/PDB:particles_game2.pdb"]
    );
}

/// Symbols left behind by an older build without a counter are never
/// overwritten.
#[test]
fn leftover_symbols_seed_generation() {
    let ctx = TestContextBuilder::new()
        .with_platform(Platform::new(Os::Windows))
        .build();
    ctx.write("build/particles_game3.pdb", "");

    ctx.dispatch(&DEBUG).unwrap();

    assert_eq!(module_pdb_args(&ctx), ["/PDB:particles_game4.pdb"]);
}

// ---------------------------------------------------------------------------
// Unsupported hosts
// ---------------------------------------------------------------------------

#[test]
fn unsupported_platform_has_no_side_effects() {
    let ctx = TestContextBuilder::new()
        .with_platform(Platform::from_name("freebsd"))
        .build();

    assert_eq!(ctx.dispatch(&DEBUG).unwrap(), Outcome::Unsupported);

    assert!(!ctx.build_path("data").exists());
    assert!(!ctx.build_path("src_hashes").exists());
    assert!(ctx.executor.run_labels().is_empty());
}
