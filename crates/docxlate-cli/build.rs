//! Embeds the short git commit hash for `docxlate --version`.
//!
//! Source tarballs carry no `.git`; packagers set `DOCXLATE_GIT_HASH` instead.

use std::process::Command;

const OVERRIDE_VAR: &str = "DOCXLATE_GIT_HASH";

fn git_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    (!hash.is_empty()).then(|| hash.to_string())
}

fn main() {
    let hash = std::env::var(OVERRIDE_VAR)
        .ok()
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .or_else(git_hash)
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", hash);
    println!("cargo:rerun-if-env-changed={}", OVERRIDE_VAR);
    // The repository root is two levels above this crate.
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/refs/heads/");
}
