//! Implementation of the `pkgwrap verify` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use pkgwrap_lib::consts::STAGE_COMPLETE_MARKER;
use pkgwrap_lib::stage::{self, Verification};

use crate::output::{print_error, print_stat, print_success};

/// Staged roots under `path`: `path` itself when it carries a completion
/// marker, otherwise every marked directory under `path/share`.
fn staged_roots(path: &Path) -> Result<Vec<PathBuf>> {
  if path.join(STAGE_COMPLETE_MARKER).is_file() {
    return Ok(vec![path.to_path_buf()]);
  }

  let share = path.join("share");
  if !share.is_dir() {
    return Ok(Vec::new());
  }

  let mut roots = Vec::new();
  for entry in std::fs::read_dir(&share).with_context(|| format!("Failed to read {}", share.display()))? {
    let root = entry.with_context(|| format!("Failed to read {}", share.display()))?.path();
    if root.join(STAGE_COMPLETE_MARKER).is_file() {
      roots.push(root);
    }
  }
  roots.sort();
  Ok(roots)
}

/// Recompute the hash of each staged tree and compare it with its marker.
pub fn cmd_verify(path: &Path) -> Result<()> {
  let roots = staged_roots(path)?;
  if roots.is_empty() {
    bail!("No staged tree found under {}", path.display());
  }

  let mut modified = 0;
  for root in &roots {
    let verification = stage::verify(root).with_context(|| format!("Failed to verify {}", root.display()))?;
    match verification {
      Verification::Intact(hash) => {
        print_success(&format!("{} intact", root.display()));
        print_stat("Hash", &hash.0);
      }
      Verification::Modified { expected, actual } => {
        modified += 1;
        print_error(&format!("{} modified", root.display()));
        print_stat("Expected", &expected.0);
        print_stat("Actual", &actual.0);
      }
    }
  }

  if modified > 0 {
    bail!("{} staged tree(s) modified", modified);
  }
  Ok(())
}
