//! Child process execution for the launcher.
//!
//! Every step of a launch is a blocking child process: the editor, the
//! migration and finally the server itself. The [`ProcessRunner`] seam lets
//! tests observe those steps without replacing the test process.

use std::collections::BTreeMap;
use std::process::Command;

use tracing::debug;

use super::LaunchError;

/// A fully resolved child command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
  pub program: String,
  pub args: Vec<String>,
  /// Variables set on top of the inherited environment.
  pub env: BTreeMap<String, String>,
}

impl CommandSpec {
  fn to_command(&self) -> Command {
    let mut command = Command::new(&self.program);
    command.args(&self.args).envs(&self.env);
    command
  }
}

pub trait ProcessRunner {
  /// Run to completion, returning the exit code (`None` if killed by a signal).
  fn run(&self, cmd: &CommandSpec) -> Result<Option<i32>, LaunchError>;

  /// Hand the process over to `cmd`. Implementations that can replace the
  /// current process never return on success; others return the child's exit
  /// code.
  fn delegate(&self, cmd: &CommandSpec) -> Result<i32, LaunchError>;
}

/// Runs real processes; `delegate` uses `execvp` on Unix.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
  fn run(&self, cmd: &CommandSpec) -> Result<Option<i32>, LaunchError> {
    debug!(program = %cmd.program, args = ?cmd.args, "running");
    let status = cmd.to_command().status().map_err(|e| LaunchError::Spawn {
      program: cmd.program.clone(),
      source: e,
    })?;
    Ok(status.code())
  }

  fn delegate(&self, cmd: &CommandSpec) -> Result<i32, LaunchError> {
    debug!(program = %cmd.program, args = ?cmd.args, "delegating");

    #[cfg(unix)]
    {
      use std::os::unix::process::CommandExt;
      // exec only returns on failure
      let err = cmd.to_command().exec();
      Err(LaunchError::Spawn {
        program: cmd.program.clone(),
        source: err,
      })
    }

    #[cfg(not(unix))]
    {
      Ok(self.run(cmd)?.unwrap_or(1))
    }
  }
}
