use std::path::PathBuf;
use std::process::Command;

/// Short commit of the workspace, shown by `klarity --version`.
fn git_sha(workspace: &PathBuf) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(workspace)
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let sha = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (!sha.is_empty()).then_some(sha)
}

fn main() {
    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into()));
    let workspace = manifest_dir.join("..");

    println!("cargo:rerun-if-changed={}", workspace.join(".git/HEAD").display());
    let sha = git_sha(&workspace).unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=KLARITY_BUILD_SHA={sha}");
}
