use std::path::{Path, PathBuf};
use std::process::Command;

/// Short description of the checked-out commit, `-dirty` when the tree has edits.
fn describe(workspace: &Path) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(workspace)
        .args(["describe", "--always", "--dirty", "--abbrev=8"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let desc = String::from_utf8(out.stdout).ok()?;
    let desc = desc.trim();
    (!desc.is_empty()).then(|| desc.to_string())
}

fn main() {
    // packagers building from a tarball can pin the value
    println!("cargo:rerun-if-env-changed=TALLY_BUILD_SHA");

    let workspace = std::env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .and_then(|dir| dir.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(".."));

    let sha = std::env::var("TALLY_BUILD_SHA")
        .ok()
        .filter(|s| !s.is_empty())
        .or_else(|| describe(&workspace))
        .unwrap_or_else(|| "unknown".to_string());

    let head = workspace.join(".git").join("HEAD");
    if head.exists() {
        println!("cargo:rerun-if-changed={}", head.display());
    }
    println!("cargo:rustc-env=TALLY_BUILD_SHA={sha}");
}
