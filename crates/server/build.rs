// SPDX-License-Identifier: AGPL-3.0-only

use std::process::Command;

fn git_output(args: &[&str]) -> String {
  Command::new("git")
    .args(args)
    .output()
    .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
    .ok()
    .filter(|s| !s.is_empty())
    .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
  println!("cargo:rustc-env=GIT_COMMIT_HASH={}", git_output(&["rev-parse", "--short", "HEAD"]));
  println!("cargo:rustc-env=GIT_BRANCH_NAME={}", git_output(&["rev-parse", "--abbrev-ref", "HEAD"]));

  // Pick up new commits and branch switches.
  println!("cargo:rerun-if-changed=.git/HEAD");
}
