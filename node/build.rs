use std::process::Command;

/// Commit the binary is built from: an explicit `GIT_COMMIT_HASH`, the CI
/// checkout's `GITHUB_SHA`, or the local repository HEAD, in that order.
fn commit_hash() -> Option<String> {
    let from_env = ["GIT_COMMIT_HASH", "GITHUB_SHA"]
        .into_iter()
        .filter_map(|key| std::env::var(key).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty());
    if from_env.is_some() {
        return from_env;
    }

    let output = Command::new("git")
        .args(["rev-parse", "--short=12", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())?;
    let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!sha.is_empty()).then_some(sha)
}

fn main() {
    println!("cargo:rerun-if-env-changed=GIT_COMMIT_HASH");
    println!("cargo:rerun-if-env-changed=GITHUB_SHA");
    println!("cargo:rerun-if-changed=../.git/HEAD");

    // Read back by `version::git_commit_hash` for the banner and the
    // `commit` label of `app_info`.
    if let Some(sha) = commit_hash() {
        println!("cargo:rustc-env=GIT_COMMIT_HASH={sha}");
    }
}
