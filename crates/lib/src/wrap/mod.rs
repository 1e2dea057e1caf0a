//! Launcher generation.
//!
//! Writes the launch plan next to the staged tree and one `/bin/sh` shim per
//! launcher into `bin/`. A shim exports the merged environment and execs
//! `pkgwrap launch`, which performs the bootstrap and runs the artifact.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ResolvedRecipe;
use crate::consts::{APP_NAME, LAUNCH_PLAN_FILE, RUNTIME_CONFIG_FILE};
use crate::launch::plan::{BootstrapPlan, LAUNCH_PLAN_VERSION, LaunchEntry, LaunchPlan};
use crate::layout::{MIGRATE_ARTIFACT, asset_dirs, bin_dir};
use crate::runtime_config::RuntimeConfig;

#[derive(Debug, Error)]
pub enum WrapError {
  #[error("failed to render default config: {0}")]
  RenderConfig(#[from] serde_yaml::Error),

  #[error("failed to serialize launch plan: {0}")]
  Serialize(#[from] serde_json::Error),

  #[error("failed to write {}: {source}", path.display())]
  Write { path: PathBuf, source: std::io::Error },
}

#[derive(Debug, Clone)]
pub struct WrapResult {
  pub plan_path: PathBuf,
  pub wrappers: Vec<PathBuf>,
}

/// Build the launch plan for a recipe whose outputs are staged at
/// `staged_root`.
pub fn launch_plan(recipe: &ResolvedRecipe, staged_root: &Path) -> Result<LaunchPlan, WrapError> {
  let default_config = RuntimeConfig::defaults(recipe.database_type).to_yaml()?;

  let launchers = recipe
    .launchers()
    .into_iter()
    .map(|launcher| LaunchEntry {
      bootstrap: launcher.bootstrap.then(|| BootstrapPlan {
        assets: asset_dirs(),
        config_path: PathBuf::from(RUNTIME_CONFIG_FILE),
        default_config: default_config.clone(),
        migrate: MIGRATE_ARTIFACT.to_string(),
      }),
      artifact: launcher.artifact,
      command: launcher.command,
      entry: launcher.entry,
    })
    .collect();

  Ok(LaunchPlan {
    version: LAUNCH_PLAN_VERSION,
    pname: recipe.pname.clone(),
    interpreter: recipe.interpreter.clone(),
    staged_root: staged_root.to_path_buf(),
    env: recipe.env.clone(),
    launchers,
  })
}

/// Quote `value` for a POSIX shell.
pub fn shell_quote(value: &str) -> String {
  format!("'{}'", value.replace('\'', r"'\''"))
}

/// Whether `name` can be used with `export` in a POSIX shell.
fn is_shell_identifier(name: &str) -> bool {
  let mut chars = name.chars();
  matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
    && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Render the shim for one launcher.
///
/// Variables whose names the shell cannot export are left to `pkgwrap launch`,
/// which applies the full environment from the plan to the artifact.
pub fn render_shim(launcher_bin: &Path, plan_path: &Path, artifact: &str, env: &BTreeMap<String, String>) -> String {
  let mut script = String::from("#!/bin/sh\n");
  script.push_str(&format!(
    "# Generated by {APP_NAME} {}; do not edit.\n",
    env!("CARGO_PKG_VERSION")
  ));

  for (key, value) in env {
    if is_shell_identifier(key) {
      script.push_str(&format!("export {}={}\n", key, shell_quote(value)));
    } else {
      warn!(key = %key, "not a shell identifier, left to the launch plan");
    }
  }

  script.push_str(&format!(
    "exec {} launch {} {} -- \"$@\"\n",
    shell_quote(&launcher_bin.to_string_lossy()),
    shell_quote(&plan_path.to_string_lossy()),
    shell_quote(artifact),
  ));
  script
}

fn write_file(path: &Path, content: &str, executable: bool) -> Result<(), WrapError> {
  let write_err = |e| WrapError::Write {
    path: path.to_path_buf(),
    source: e,
  };
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).map_err(write_err)?;
  }
  std::fs::write(path, content).map_err(write_err)?;

  #[cfg(unix)]
  if executable {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).map_err(write_err)?;
  }
  #[cfg(not(unix))]
  let _ = executable;

  Ok(())
}

/// Write the launch plan into the staged root and the shims into
/// `<out>/bin`. `launcher_bin` is the `pkgwrap` executable the shims exec.
pub fn write_wrappers(plan: &LaunchPlan, out: &Path, launcher_bin: &Path) -> Result<WrapResult, WrapError> {
  let plan_path = plan.staged_root.join(LAUNCH_PLAN_FILE);
  write_file(&plan_path, &plan.to_json()?, false)?;
  debug!(path = %plan_path.display(), "wrote launch plan");

  let bin = bin_dir(out);
  let mut wrappers = Vec::with_capacity(plan.launchers.len());

  for entry in &plan.launchers {
    let path = bin.join(&entry.command);
    let shim = render_shim(launcher_bin, &plan_path, &entry.artifact, &plan.env);
    write_file(&path, &shim, true)?;
    info!(command = %entry.command, artifact = %entry.artifact, "wrote launcher");
    wrappers.push(path);
  }

  Ok(WrapResult { plan_path, wrappers })
}
