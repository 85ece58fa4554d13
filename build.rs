// SPDX-License-Identifier: GPL-3.0-only

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");

    // Packaging environments can pin the version without a git checkout
    let version = match std::env::var("QRSCAN_VERSION") {
        Ok(v) => v,
        Err(_) => git_version(),
    };

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// Version string from `git describe`, falling back to the crate version.
fn git_version() -> String {
    let described = Command::new("git")
        .args(["describe", "--tags", "--always", "--match", "v*"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string());

    match described {
        Some(version) => version.strip_prefix('v').unwrap_or(&version).to_string(),
        None => env!("CARGO_PKG_VERSION").to_string(),
    }
}
