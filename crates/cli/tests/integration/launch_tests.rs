//! Generated launcher integration tests.
//!
//! The launchers are run exactly as a user would run them: the shim in
//! `out/bin` execs `pkgwrap launch`, which bootstraps the working directory
//! and then runs the entry module with `/bin/sh` as the interpreter.

use std::os::unix::fs::PermissionsExt;

use predicates::prelude::*;

use super::common::{TestEnv, read};

#[test]
fn cold_start_writes_private_config_and_stops() {
  let env = TestEnv::new("");
  env.install();
  let work = env.work_path();

  env
    .launcher("proxy")
    .args(["--port", "8080"])
    .assert()
    .code(78)
    .stderr(predicate::str::contains("config.yml"));

  let config = work.join("config.yml");
  assert!(read(&config).contains("type: sqlite"));
  let mode = std::fs::metadata(&config).unwrap().permissions().mode();
  assert_eq!(mode & 0o777, 0o600);

  assert!(!work.join("migrate.out").exists(), "migration must not run");
  assert!(!work.join("server.out").exists());
  assert!(work.join("dist/server.js").is_file());
  assert!(std::fs::symlink_metadata(work.join("node_modules")).unwrap().file_type().is_symlink());
}

#[test]
fn warm_start_migrates_then_runs_server_with_args() {
  let env = TestEnv::new("");
  env.install();
  let work = env.work_path();

  env.launcher("proxy").assert().code(78);
  env
    .launcher("proxy")
    .args(["--port", "8080"])
    .assert()
    .success();

  assert_eq!(read(&work.join("migrate.out")), "migrated\n");
  assert_eq!(read(&work.join("server.out")), "server --port 8080\n");
}

#[test]
fn existing_config_is_left_alone() {
  let env = TestEnv::new("");
  env.install();
  let work = env.work_path();
  env.write_file("work/config.yml", "custom: true\n");

  env.launcher("proxy").assert().success();

  assert_eq!(read(&work.join("config.yml")), "custom: true\n");
}

#[test]
fn managed_assets_are_restored_each_launch() {
  let env = TestEnv::new("");
  env.install();
  let work = env.work_path();
  env.write_file("work/config.yml", "custom: true\n");

  env.launcher("proxy").assert().success();
  let original = read(&work.join("dist/server.js"));

  std::fs::write(work.join("dist/server.js"), "echo local edit\n").unwrap();
  env.write_file("work/dist/stray.js", "");
  env.launcher("proxy").assert().success();

  assert_eq!(read(&work.join("dist/server.js")), original);
  assert!(!work.join("dist/stray.js").exists());
}

#[test]
fn sentinel_opts_asset_out_of_sync() {
  let env = TestEnv::new("");
  env.install();
  let work = env.work_path();
  env.write_file("work/config.yml", "custom: true\n");
  env.write_file("work/public/.pkgwrap-unmanaged", "");
  env.write_file("work/public/custom.html", "<p>mine</p>\n");

  env.launcher("proxy").assert().success();

  assert!(!std::fs::symlink_metadata(work.join("public")).unwrap().file_type().is_symlink());
  assert_eq!(read(&work.join("public/custom.html")), "<p>mine</p>\n");
}

#[test]
fn failed_migration_never_starts_server() {
  let env = TestEnv::new("");
  env.write_file("src/dist/migrate.js", "exit 3\n");
  env.install();
  let work = env.work_path();
  env.write_file("work/config.yml", "custom: true\n");

  env.launcher("proxy").assert().code(3);

  assert!(!work.join("server.out").exists());
}

#[test]
fn editor_continues_first_run() {
  let env = TestEnv::new("");
  env.install();
  let work = env.work_path();

  env.launcher("proxy").env("EDITOR", "true").assert().success();

  assert!(work.join("config.yml").is_file());
  assert!(work.join("migrate.out").is_file());
  assert!(work.join("server.out").is_file());
}

#[test]
fn failing_editor_stops_launch() {
  let env = TestEnv::new("");
  env.install();
  let work = env.work_path();

  env.launcher("proxy").env("EDITOR", "false").assert().code(1);

  assert!(!work.join("migrate.out").exists());
}

#[test]
fn migrate_launcher_skips_bootstrap() {
  let env = TestEnv::new("");
  env.install();
  let work = env.work_path();

  env.launcher("proxy-migrate").assert().success();

  assert_eq!(read(&work.join("migrate.out")), "migrated\n");
  assert!(!work.join("config.yml").exists());
  assert!(!work.join("dist").exists());
}

#[test]
fn launcher_exports_merged_environment() {
  let env = TestEnv::new("[environment_variables]\nNODE_ENV = \"staging\"\nGREETING = \"it's me\"\n");
  env.write_file("src/dist/server.js", "echo \"$GREETING $NODE_ENV $ENVIRONMENT\" > server.out\n");
  env.install();
  let work = env.work_path();
  env.write_file("work/config.yml", "custom: true\n");

  env.launcher("proxy").assert().success();

  assert_eq!(read(&work.join("server.out")), "it's me staging production\n");
}
