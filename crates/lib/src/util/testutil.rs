//! Test helpers for pkgwrap-lib.
//!
//! Builds a miniature server source tree with the layout the staging and
//! launcher code expects. Entry modules are plain `/bin/sh` scripts so tests
//! can run them with `/bin/sh` as the interpreter.

use std::fs;
use std::path::{Path, PathBuf};

use crate::layout::{REFERENCE_DATA_FILES, STYLESHEET_PATH};

pub const REMOTE_FONT_IMPORT: &str =
  "@import url('https://fonts.googleapis.com/css2?family=Inter:wght@400;700&display=swap');";

pub fn write(path: &Path, content: &str) {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(path, content).unwrap();
}

/// Populate `root` with a built server tree: dependencies, compiled output,
/// static assets, reference data and the stylesheet.
pub fn fake_source_tree(root: &Path) -> PathBuf {
  write(&root.join("node_modules/left-pad/index.js"), "module.exports = 1;\n");
  write(&root.join("dist/server.js"), "echo \"server $*\" > server.out\n");
  write(&root.join("dist/migrate.js"), "echo migrated > migrate.out\n");
  write(&root.join("public/index.html"), "<html></html>\n");
  for name in REFERENCE_DATA_FILES {
    write(&root.join(name), "[]\n");
  }
  write(
    &root.join(STYLESHEET_PATH),
    &format!("{REMOTE_FONT_IMPORT}\n\nbody {{ margin: 0; }}\n"),
  );
  root.to_path_buf()
}
