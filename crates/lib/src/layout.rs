//! Fixed layout of the packaged server: which paths get staged, which
//! working-directory assets the primary launcher manages, and which
//! launchers are generated.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How an asset directory is materialized in the launcher's working directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStrategy {
  /// Fresh physical copy of the staged directory.
  Copy,
  /// Symbolic link pointing into the staged tree.
  Symlink,
}

/// A working-directory path re-synchronized on every primary launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDir {
  /// Path relative to both the working directory and the staged root.
  pub path: String,
  pub strategy: AssetStrategy,
}

/// Asset table, processed in order.
pub const ASSET_DIRS: &[(&str, AssetStrategy)] = &[
  ("dist", AssetStrategy::Copy),
  ("node_modules", AssetStrategy::Symlink),
  ("public", AssetStrategy::Symlink),
];

pub fn asset_dirs() -> Vec<AssetDir> {
  ASSET_DIRS
    .iter()
    .map(|(path, strategy)| AssetDir {
      path: path.to_string(),
      strategy: *strategy,
    })
    .collect()
}

/// Directories copied from the build tree into the staged tree.
pub const STAGED_DIRS: &[&str] = &["node_modules", "dist", "public"];

/// Reference-data files copied alongside the staged directories.
pub const REFERENCE_DATA_FILES: &[&str] = &["countries.json", "languages.json", "timezones.json"];

/// Stylesheet carrying the remote font import, relative to the source root.
pub const STYLESHEET_PATH: &str = "src/app/globals.css";

/// Where the vendored font lands in the source tree.
pub const FONT_DIR: &str = "public/fonts";

/// URL prefix under which `public/` is served.
pub const FONT_URL_PREFIX: &str = "/fonts";

/// A generated entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Launcher {
  /// Logical artifact name, used to address the launcher at runtime.
  pub artifact: String,
  /// Entry module, relative to the staged root.
  pub entry: String,
  /// Name of the generated command in `bin/`.
  pub command: String,
  /// Whether the launcher runs the working-directory bootstrap first.
  pub bootstrap: bool,
}

pub const SERVER_ARTIFACT: &str = "server";
pub const MIGRATE_ARTIFACT: &str = "migrate";

/// Launchers in generation order. The server launcher is the only one that
/// bootstraps; the migration launcher runs its artifact directly.
pub fn launchers(pname: &str) -> Vec<Launcher> {
  vec![
    Launcher {
      artifact: SERVER_ARTIFACT.to_string(),
      entry: "dist/server.js".to_string(),
      command: pname.to_string(),
      bootstrap: true,
    },
    Launcher {
      artifact: MIGRATE_ARTIFACT.to_string(),
      entry: "dist/migrate.js".to_string(),
      command: format!("{pname}-migrate"),
      bootstrap: false,
    },
  ]
}

/// Root of the staged distribution inside an output directory.
pub fn share_dir(out: &Path, pname: &str) -> PathBuf {
  out.join("share").join(pname)
}

pub fn bin_dir(out: &Path) -> PathBuf {
  out.join("bin")
}
