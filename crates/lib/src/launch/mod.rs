//! Runtime side of the generated launchers.
//!
//! A launcher shim execs `pkgwrap launch <plan> <artifact> -- args...`. The
//! primary (server) launcher bootstraps the working directory first; the
//! migration launcher runs its artifact directly. Child failures are passed
//! through as exit codes without further diagnostics.

pub mod bootstrap;
pub mod plan;
pub mod runner;

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::consts::{CONFIG_PENDING_EXIT_CODE, EDITOR_VAR};

pub use bootstrap::{BootstrapState, ConfigStatus, SyncAction, SyncedAsset};
pub use plan::{BootstrapPlan, LaunchEntry, LaunchPlan};
pub use runner::{CommandSpec, ProcessRunner, SystemRunner};

#[derive(Debug, Error)]
pub enum LaunchError {
  #[error("failed to read launch plan {}: {source}", path.display())]
  ReadPlan { path: PathBuf, source: std::io::Error },

  #[error("failed to parse launch plan {}: {source}", path.display())]
  ParsePlan { path: PathBuf, source: serde_json::Error },

  #[error("unknown launcher '{name}'")]
  UnknownLauncher { name: String },

  #[error("failed to sync {}: {source}", path.display())]
  AssetSync { path: PathBuf, source: std::io::Error },

  #[error("failed to write config {}: {source}", path.display())]
  WriteConfig { path: PathBuf, source: std::io::Error },

  /// A default config was just created and must be reviewed before the
  /// server can start.
  #[error("created {}; edit it (or set $EDITOR) and run again", path.display())]
  ConfigPending { path: PathBuf },

  #[error("editor '{editor}' exited with status {code:?}")]
  EditorFailed { editor: String, code: Option<i32> },

  #[error("migration exited with status {code:?}")]
  MigrationFailed { code: Option<i32> },

  #[error("failed to run {program}: {source}")]
  Spawn { program: String, source: std::io::Error },
}

impl LaunchError {
  /// Process exit status for this error. Child failures keep the child's
  /// own status.
  pub fn exit_code(&self) -> i32 {
    match self {
      LaunchError::ConfigPending { .. } => CONFIG_PENDING_EXIT_CODE,
      LaunchError::EditorFailed { code, .. } | LaunchError::MigrationFailed { code } => code.unwrap_or(1),
      _ => 1,
    }
  }

  /// Whether a child process already reported this failure itself.
  pub fn is_child_failure(&self) -> bool {
    matches!(
      self,
      LaunchError::EditorFailed { .. } | LaunchError::MigrationFailed { .. }
    )
  }
}

/// Per-invocation inputs taken from the process environment.
#[derive(Debug, Clone)]
pub struct LaunchContext {
  pub workdir: PathBuf,
  pub editor: Option<String>,
}

impl LaunchContext {
  /// Current directory and `$EDITOR` (empty counts as unset).
  pub fn from_env() -> std::io::Result<Self> {
    Ok(Self {
      workdir: std::env::current_dir()?,
      editor: std::env::var(EDITOR_VAR).ok().filter(|e| !e.trim().is_empty()),
    })
  }
}

/// Run launcher `artifact` from `plan` with the forwarded `args`.
///
/// Returns the exit code of the delegated artifact when the runner cannot
/// replace the current process.
pub fn run_launcher(
  plan: &LaunchPlan,
  artifact: &str,
  args: &[String],
  ctx: &LaunchContext,
  runner: &dyn ProcessRunner,
) -> Result<i32, LaunchError> {
  let entry = plan.launcher(artifact)?;

  if let Some(bootstrap_plan) = &entry.bootstrap {
    let state = bootstrap::run(plan, bootstrap_plan, ctx, runner)?;
    bootstrap::transition(state, BootstrapState::Running);
  }

  info!(artifact = %entry.artifact, "starting");
  runner.delegate(&plan.command(entry, args))
}
