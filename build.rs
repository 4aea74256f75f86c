//! Build script: embeds the bootfiles version string into the binary.

use std::process::Command;

/// Version recorded in the binary: an explicit `BOOTFILES_VERSION` from the
/// image build wins, then `git describe` of the working tree.  With neither,
/// nothing is emitted and the crate version is used at runtime.
fn embedded_version() -> Option<String> {
    if let Ok(version) = std::env::var("BOOTFILES_VERSION") {
        return Some(version);
    }
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|o| o.status.success())?;
    let described = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!described.is_empty()).then_some(described)
}

fn main() {
    if let Some(version) = embedded_version() {
        println!("cargo:rustc-env=BOOTFILES_VERSION={version}");
    }

    println!("cargo:rerun-if-env-changed=BOOTFILES_VERSION");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
}
