//! The launch plan: everything a generated launcher needs at runtime,
//! serialized next to the staged tree at build time.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::LaunchError;
use super::runner::CommandSpec;
use crate::layout::AssetDir;

pub const LAUNCH_PLAN_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchPlan {
  pub version: u32,
  pub pname: String,
  /// Program that runs the entry modules.
  pub interpreter: String,
  /// Absolute path of the staged tree.
  pub staged_root: PathBuf,
  /// Merged launcher environment.
  pub env: BTreeMap<String, String>,
  pub launchers: Vec<LaunchEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchEntry {
  pub artifact: String,
  pub command: String,
  /// Entry module, relative to the staged root.
  pub entry: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bootstrap: Option<BootstrapPlan>,
}

/// Working-directory initialization run before the primary artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapPlan {
  pub assets: Vec<AssetDir>,
  /// Runtime config path, relative to the working directory.
  pub config_path: PathBuf,
  pub default_config: String,
  /// Artifact name of the launcher that migrates the database.
  pub migrate: String,
}

impl LaunchPlan {
  pub fn from_file(path: &Path) -> Result<Self, LaunchError> {
    let content = std::fs::read_to_string(path).map_err(|e| LaunchError::ReadPlan {
      path: path.to_path_buf(),
      source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| LaunchError::ParsePlan {
      path: path.to_path_buf(),
      source: e,
    })
  }

  pub fn to_json(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(self)
  }

  pub fn launcher(&self, artifact: &str) -> Result<&LaunchEntry, LaunchError> {
    self
      .launchers
      .iter()
      .find(|l| l.artifact == artifact)
      .ok_or_else(|| LaunchError::UnknownLauncher {
        name: artifact.to_string(),
      })
  }

  /// Command that runs `entry` with `args` under the plan's environment.
  pub fn command(&self, entry: &LaunchEntry, args: &[String]) -> CommandSpec {
    let mut argv = vec![self.staged_root.join(&entry.entry).to_string_lossy().into_owned()];
    argv.extend(args.iter().cloned());
    CommandSpec {
      program: self.interpreter.clone(),
      args: argv,
      env: self.env.clone(),
    }
  }
}
