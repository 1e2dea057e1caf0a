//! Build and install command integration tests.

use predicates::prelude::*;

use super::common::{REMOTE_FONT_IMPORT, TestEnv, read};

#[test]
fn install_stages_tree_and_writes_launchers() {
  let env = TestEnv::new("");

  env
    .pkgwrap_cmd()
    .arg("install")
    .arg(&env.recipe_path)
    .arg("--src")
    .arg(env.src_path())
    .arg("--out")
    .arg(env.out_path())
    .assert()
    .success()
    .stdout(predicate::str::contains("Installed proxy 0.0.0"));

  let staged = env.staged_path();
  for path in ["node_modules", "dist", "public", "countries.json", "languages.json", "timezones.json"] {
    assert!(staged.join(path).exists(), "{path} not staged");
  }
  assert!(staged.join(".pkgwrap-complete").is_file());
  assert!(staged.join("launch.json").is_file());
  assert!(env.out_path().join("bin/proxy").is_file());
  assert!(env.out_path().join("bin/proxy-migrate").is_file());
}

#[cfg(unix)]
#[test]
fn reinstall_replaces_previous_output() {
  let env = TestEnv::new("");
  std::fs::create_dir_all(env.src_path().join("node_modules/.bin")).unwrap();
  std::os::unix::fs::symlink("../left-pad/index.js", env.src_path().join("node_modules/.bin/left-pad")).unwrap();
  env.write_file("src/dist/stale.js", "");
  env.install();

  std::fs::remove_file(env.src_path().join("dist/stale.js")).unwrap();
  env.install();

  assert!(!env.staged_path().join("dist/stale.js").exists());
  env.pkgwrap_cmd().arg("verify").arg(env.out_path()).assert().success();
}

#[test]
fn verbose_flag_enables_debug_logging() {
  let env = TestEnv::new("");

  env
    .pkgwrap_cmd()
    .arg("-v")
    .arg("install")
    .arg(&env.recipe_path)
    .arg("--src")
    .arg(env.src_path())
    .arg("--out")
    .arg(env.out_path())
    .env_remove("RUST_LOG")
    .assert()
    .success()
    .stderr(predicate::str::contains("resolved launcher binary"))
    .stderr(predicate::str::contains("staging build outputs"));
}

#[test]
fn install_missing_source_fails_without_output() {
  let env = TestEnv::new("");
  std::fs::remove_dir_all(env.src_path().join("dist")).unwrap();

  env
    .pkgwrap_cmd()
    .arg("install")
    .arg(&env.recipe_path)
    .arg("--src")
    .arg(env.src_path())
    .arg("--out")
    .arg(env.out_path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("dist"));

  assert!(!env.staged_path().join(".pkgwrap-complete").exists());
  assert!(!env.out_path().join("bin").exists());
}

#[test]
fn invalid_database_type_fails_before_mutation() {
  let env = TestEnv::new("database_type = \"oracle\"\nfont = \"Inter.ttf\"\n");
  env.write_file("Inter.ttf", "font");

  env
    .pkgwrap_cmd()
    .arg("build")
    .arg(&env.recipe_path)
    .arg("--src")
    .arg(env.src_path())
    .arg("--out")
    .arg(env.out_path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid database type 'oracle'"));

  assert!(!env.out_path().exists());
  assert!(read(&env.src_path().join("src/app/globals.css")).contains(REMOTE_FONT_IMPORT));
}

#[test]
fn build_vendors_font_when_skipping_scripts() {
  let env = TestEnv::new("font = \"Inter.ttf\"\n");
  env.write_file("Inter.ttf", "font");

  env
    .pkgwrap_cmd()
    .arg("build")
    .arg(&env.recipe_path)
    .arg("--src")
    .arg(env.src_path())
    .arg("--out")
    .arg(env.out_path())
    .arg("--skip-scripts")
    .assert()
    .success()
    .stdout(predicate::str::contains("Skipping build scripts"))
    .stdout(predicate::str::contains("Built proxy"));

  let css = read(&env.src_path().join("src/app/globals.css"));
  assert!(!css.contains("fonts.googleapis.com"));
  assert!(css.contains("/fonts/Inter.ttf"));
  assert!(env.staged_path().join("public/fonts/Inter.ttf").is_file());
}

#[cfg(unix)]
#[test]
fn build_runs_backend_scripts_in_order() {
  let env = TestEnv::new("database_type = \"pg\"\nscript_runner = \"echo >> scripts.log\"\n");

  env
    .pkgwrap_cmd()
    .arg("build")
    .arg(&env.recipe_path)
    .arg("--src")
    .arg(env.src_path())
    .arg("--out")
    .arg(env.out_path())
    .assert()
    .success();

  assert_eq!(read(&env.src_path().join("scripts.log")), "db:pg\ndb:generate\nbuild\n");
}

#[cfg(unix)]
#[test]
fn failing_script_stops_build() {
  let env = TestEnv::new("script_runner = \"false\"\n");

  env
    .pkgwrap_cmd()
    .arg("build")
    .arg(&env.recipe_path)
    .arg("--src")
    .arg(env.src_path())
    .arg("--out")
    .arg(env.out_path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("db:sqlite"));

  assert!(!env.out_path().exists());
}
