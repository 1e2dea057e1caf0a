//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

pub const REMOTE_FONT_IMPORT: &str =
  "@import url('https://fonts.googleapis.com/css2?family=Inter:wght@400;700&display=swap');";

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding a recipe, a built
/// source tree, the output directory and a working directory for launches.
pub struct TestEnv {
  pub temp: TempDir,
  pub recipe_path: PathBuf,
}

impl TestEnv {
  /// Create an environment whose recipe runs entry modules with `/bin/sh`.
  pub fn new(extra_recipe: &str) -> Self {
    let temp = TempDir::new().unwrap();
    let recipe_path = temp.path().join("recipe.toml");
    let env = Self { temp, recipe_path };
    env.write_file("recipe.toml", &format!("interpreter = \"/bin/sh\"\n{extra_recipe}"));
    env.write_source_tree();
    env
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// A built server tree. The entry modules are shell scripts that record
  /// their invocation in the current directory.
  fn write_source_tree(&self) {
    self.write_file("src/node_modules/left-pad/index.js", "module.exports = 1;\n");
    self.write_file("src/dist/server.js", "echo \"server $*\" > server.out\n");
    self.write_file("src/dist/migrate.js", "echo migrated >> migrate.out\n");
    self.write_file("src/public/index.html", "<html></html>\n");
    for name in ["countries.json", "languages.json", "timezones.json"] {
      self.write_file(&format!("src/{name}"), "[]\n");
    }
    self.write_file(
      "src/src/app/globals.css",
      &format!("{REMOTE_FONT_IMPORT}\n\nbody {{ margin: 0; }}\n"),
    );
  }

  pub fn src_path(&self) -> PathBuf {
    self.temp.path().join("src")
  }

  pub fn out_path(&self) -> PathBuf {
    self.temp.path().join("out")
  }

  /// Working directory for launcher runs.
  pub fn work_path(&self) -> PathBuf {
    let p = self.temp.path().join("work");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  pub fn staged_path(&self) -> PathBuf {
    self.out_path().join("share").join("proxy")
  }

  pub fn pkgwrap_cmd(&self) -> Command {
    cargo_bin_cmd!("pkgwrap")
  }

  /// `pkgwrap install` for this environment.
  pub fn install(&self) {
    self
      .pkgwrap_cmd()
      .arg("install")
      .arg(&self.recipe_path)
      .arg("--src")
      .arg(self.src_path())
      .arg("--out")
      .arg(self.out_path())
      .assert()
      .success();
  }

  /// Command running a generated launcher from the working directory, with
  /// no editor configured.
  pub fn launcher(&self, name: &str) -> Command {
    let mut cmd = Command::new(self.out_path().join("bin").join(name));
    cmd.current_dir(self.work_path());
    cmd.env_remove("EDITOR");
    cmd
  }
}

pub fn read(path: &Path) -> String {
  std::fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}
