//! Implementation of the `pkgwrap launch` command.
//!
//! Entry point of the generated shims. Never returns: on Unix a successful
//! launch replaces this process with the artifact, otherwise the process exits
//! with the launch status.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use pkgwrap_lib::launch::{self, LaunchContext, LaunchError, LaunchPlan, SystemRunner};

use crate::output::{print_error, print_warning};

pub fn cmd_launch(plan_path: &Path, launcher: &str, args: &[String]) -> Result<()> {
  let ctx = LaunchContext::from_env().context("Failed to read the working directory")?;
  debug!(plan = %plan_path.display(), launcher, workdir = %ctx.workdir.display(), "launching");

  let result = LaunchPlan::from_file(plan_path)
    .and_then(|plan| launch::run_launcher(&plan, launcher, args, &ctx, &SystemRunner));

  let code = match result {
    Ok(code) => code,
    Err(err) => {
      debug!(error = ?err, code = err.exit_code(), "launch failed");
      report(&err);
      err.exit_code()
    }
  };
  std::process::exit(code)
}

fn report(err: &LaunchError) {
  match err {
    LaunchError::ConfigPending { .. } => print_warning(&err.to_string()),
    // the child already reported its failure
    e if e.is_child_failure() => {}
    _ => print_error(&err.to_string()),
  }
}
