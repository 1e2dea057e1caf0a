//! Verify command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn verify_fresh_install_is_intact() {
  let env = TestEnv::new("");
  env.install();

  env
    .pkgwrap_cmd()
    .arg("verify")
    .arg(env.out_path())
    .assert()
    .success()
    .stdout(predicate::str::contains("intact"));

  // The staged root itself is accepted too
  env.pkgwrap_cmd().arg("verify").arg(env.staged_path()).assert().success();
}

#[test]
fn verify_detects_tampering() {
  let env = TestEnv::new("");
  env.install();
  std::fs::write(env.staged_path().join("dist/server.js"), "echo tampered\n").unwrap();

  env
    .pkgwrap_cmd()
    .arg("verify")
    .arg(env.out_path())
    .assert()
    .failure()
    .stdout(predicate::str::contains("Expected"))
    .stderr(predicate::str::contains("modified"))
    .stderr(predicate::str::contains("1 staged tree(s) modified"));
}
