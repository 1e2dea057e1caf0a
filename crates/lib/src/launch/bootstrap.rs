//! Working-directory bootstrap for the primary launcher.
//!
//! Runs on every invocation, in order: asset sync, config scaffolding, then
//! database migration. Any failure ends the invocation; the next one starts
//! again from [`BootstrapState::ColdStart`].

use std::path::Path;

use tracing::{debug, info};

use super::plan::{BootstrapPlan, LaunchPlan};
use super::runner::{CommandSpec, ProcessRunner};
use super::{LaunchContext, LaunchError};
use crate::consts::UNMANAGED_SENTINEL;
use crate::layout::{AssetDir, AssetStrategy};
use crate::util::fs::{copy_tree, create_symlink, remove_path, write_private};

/// Bootstrap progress. `AwaitEdit` is terminal (surfaced as
/// [`LaunchError::ConfigPending`]); `Running` is entered when the server is
/// handed the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
  ColdStart,
  AssetsSynced,
  AwaitEdit,
  ConfigReady,
  Migrated,
  Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
  Copied,
  Linked,
  /// Sentinel present; left untouched.
  Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedAsset {
  pub path: String,
  pub action: SyncAction,
}

/// Re-materialize every asset directory in `workdir` from `staged_root`.
///
/// Whatever currently sits at an asset path is removed first, so local
/// changes to a managed directory do not survive a launch. Directories that
/// contain the sentinel file are skipped.
pub fn sync_assets(workdir: &Path, staged_root: &Path, assets: &[AssetDir]) -> Result<Vec<SyncedAsset>, LaunchError> {
  let mut synced = Vec::with_capacity(assets.len());

  for asset in assets {
    let dest = workdir.join(&asset.path);
    let sentinel = dest.join(UNMANAGED_SENTINEL);

    if sentinel.exists() {
      debug!(path = %asset.path, "sentinel present, skipping");
      synced.push(SyncedAsset {
        path: asset.path.clone(),
        action: SyncAction::Skipped,
      });
      continue;
    }

    let source = staged_root.join(&asset.path);
    let sync_err = |e| LaunchError::AssetSync {
      path: dest.clone(),
      source: e,
    };

    remove_path(&dest).map_err(sync_err)?;
    let action = match asset.strategy {
      AssetStrategy::Copy => {
        copy_tree(&source, &dest, true).map_err(sync_err)?;
        SyncAction::Copied
      }
      AssetStrategy::Symlink => {
        create_symlink(&source, &dest).map_err(sync_err)?;
        SyncAction::Linked
      }
    };

    debug!(path = %asset.path, ?action, "synced asset");
    synced.push(SyncedAsset {
      path: asset.path.clone(),
      action,
    });
  }

  Ok(synced)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigStatus {
  /// A config file already existed.
  Present,
  /// Freshly created and opened in the editor.
  Edited,
}

/// Command that opens `path` in `editor`. The editor string may carry its own
/// arguments (`"code --wait"`), so it goes through the shell.
pub fn editor_command(editor: &str, path: &Path) -> CommandSpec {
  let path = path.to_string_lossy().into_owned();

  #[cfg(unix)]
  let (program, args) = (
    "/bin/sh".to_string(),
    vec!["-c".to_string(), format!("{editor} \"$1\""), "sh".to_string(), path],
  );
  #[cfg(not(unix))]
  let (program, args) = (editor.to_string(), vec![path]);

  CommandSpec {
    program,
    args,
    env: Default::default(),
  }
}

/// Create the runtime config if it is missing.
///
/// A new config is written owner-only. Without an editor the launch stops
/// with [`LaunchError::ConfigPending`]; with one, the editor runs to
/// completion and the launch continues.
pub fn ensure_config(
  workdir: &Path,
  bootstrap: &BootstrapPlan,
  editor: Option<&str>,
  runner: &dyn ProcessRunner,
) -> Result<ConfigStatus, LaunchError> {
  let path = workdir.join(&bootstrap.config_path);
  // a symlink counts as present even when dangling
  if path.symlink_metadata().is_ok() {
    return Ok(ConfigStatus::Present);
  }

  let write_err = |e| LaunchError::WriteConfig {
    path: path.clone(),
    source: e,
  };
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).map_err(write_err)?;
  }
  write_private(&path, bootstrap.default_config.as_bytes()).map_err(write_err)?;
  info!(path = %path.display(), "created default config");

  let Some(editor) = editor else {
    return Err(LaunchError::ConfigPending { path });
  };

  let code = runner.run(&editor_command(editor, &path))?;
  if code != Some(0) {
    return Err(LaunchError::EditorFailed {
      editor: editor.to_string(),
      code,
    });
  }

  Ok(ConfigStatus::Edited)
}

/// Run the migration launcher's artifact and require it to succeed.
pub fn migrate(plan: &LaunchPlan, bootstrap: &BootstrapPlan, runner: &dyn ProcessRunner) -> Result<(), LaunchError> {
  let entry = plan.launcher(&bootstrap.migrate)?;
  info!(artifact = %entry.artifact, "running migrations");

  match runner.run(&plan.command(entry, &[]))? {
    Some(0) => Ok(()),
    code => Err(LaunchError::MigrationFailed { code }),
  }
}

/// Run the full bootstrap sequence. Returns [`BootstrapState::Migrated`] when
/// the server may start.
pub fn run(
  plan: &LaunchPlan,
  bootstrap: &BootstrapPlan,
  ctx: &LaunchContext,
  runner: &dyn ProcessRunner,
) -> Result<BootstrapState, LaunchError> {
  let mut state = BootstrapState::ColdStart;
  debug!(?state, workdir = %ctx.workdir.display(), "bootstrap");

  sync_assets(&ctx.workdir, &plan.staged_root, &bootstrap.assets)?;
  state = transition(state, BootstrapState::AssetsSynced);

  match ensure_config(&ctx.workdir, bootstrap, ctx.editor.as_deref(), runner) {
    Ok(_) => state = transition(state, BootstrapState::ConfigReady),
    Err(e @ LaunchError::ConfigPending { .. }) => {
      transition(state, BootstrapState::AwaitEdit);
      return Err(e);
    }
    Err(e) => return Err(e),
  }

  migrate(plan, bootstrap, runner)?;
  Ok(transition(state, BootstrapState::Migrated))
}

pub(crate) fn transition(from: BootstrapState, to: BootstrapState) -> BootstrapState {
  debug!(?from, ?to, "bootstrap transition");
  to
}
