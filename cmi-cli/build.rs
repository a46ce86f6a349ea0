use std::process::Command;

/// Packaged builds have no `.git`; they pass the revision in `CMI_BUILD_SHA`.
fn git_revision(repo_root: &str) -> Option<String> {
    let out = Command::new("git")
        .args(["-C", repo_root, "describe", "--always", "--dirty", "--abbrev=8"])
        .output()
        .ok()?;
    let rev = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (out.status.success() && !rev.is_empty()).then_some(rev)
}

fn main() {
    println!("cargo:rerun-if-env-changed=CMI_BUILD_SHA");
    println!("cargo:rerun-if-changed=../.git/HEAD");

    let rev = std::env::var("CMI_BUILD_SHA")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| {
            let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").ok()?;
            git_revision(&format!("{manifest_dir}/.."))
        })
        .unwrap_or_else(|| format!("v{}", std::env::var("CARGO_PKG_VERSION").unwrap_or_default()));

    println!("cargo:rustc-env=CMI_BUILD_SHA={rev}");
}
