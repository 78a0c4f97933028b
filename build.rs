//! Build script that embeds version information.

use std::process::Command;

fn main() {
    // Prefer COMPILE_VERSION if set (release packaging), otherwise fall back
    // to git describe for local development builds.
    if let Ok(version) = std::env::var("COMPILE_VERSION") {
        println!("cargo:rustc-env=COMPILE_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=COMPILE_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=COMPILE_VERSION");
}
