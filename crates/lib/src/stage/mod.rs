//! Assembly of the staged distribution tree.
//!
//! Staging is a pure copy of the build's dependency tree, compiled output,
//! static assets and reference-data files into one directory. All sources are
//! checked before anything is copied. Restaging replaces what an earlier run
//! left behind, and the marker is only present while the tree is complete.
//! Once the copy finishes, a marker with the tree's content hash is written
//! so the tree can be verified later.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::consts::{LAUNCH_PLAN_FILE, STAGE_COMPLETE_MARKER};
use crate::layout::{REFERENCE_DATA_FILES, STAGED_DIRS};
use crate::util::fs::{copy_tree, remove_path};
use crate::util::hash::{ContentHash, DirHashError, hash_directory};

/// Top-level entries excluded when hashing the staged tree: the marker itself
/// and the launch plan, which is written after staging.
const STAGE_HASH_EXCLUSIONS: &[&str] = &[STAGE_COMPLETE_MARKER, LAUNCH_PLAN_FILE];

#[derive(Debug, Error)]
pub enum StageError {
  #[error("missing source path: {}", path.display())]
  MissingSource { path: PathBuf },

  #[error("failed to clear {}: {source}", path.display())]
  Clear { path: PathBuf, source: std::io::Error },

  #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
  Copy {
    from: PathBuf,
    to: PathBuf,
    source: std::io::Error,
  },

  #[error("failed to hash staged tree: {0}")]
  Hash(#[from] DirHashError),

  #[error("failed to write marker {}: {source}", path.display())]
  WriteMarker { path: PathBuf, source: std::io::Error },

  #[error("failed to read marker {}: {message}", path.display())]
  ReadMarker { path: PathBuf, message: String },

  #[error("no staged tree at {}", path.display())]
  NotStaged { path: PathBuf },
}

/// Completion marker content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageMarker {
  pub version: u32,
  pub output_hash: ContentHash,
}

#[derive(Debug, Clone)]
pub struct StageResult {
  pub root: PathBuf,
  pub output_hash: ContentHash,
}

/// Relative paths that make up a staged tree, in copy order.
pub fn staged_paths() -> impl Iterator<Item = &'static str> {
  STAGED_DIRS.iter().chain(REFERENCE_DATA_FILES.iter()).copied()
}

/// Copy the build outputs under `src` into `root`.
pub fn stage(src: &Path, root: &Path) -> Result<StageResult, StageError> {
  info!(src = %src.display(), root = %root.display(), "staging build outputs");

  if let Some(missing) = staged_paths().map(|p| src.join(p)).find(|p| !p.exists()) {
    return Err(StageError::MissingSource { path: missing });
  }

  let clear = |path: PathBuf| remove_path(&path).map_err(|e| StageError::Clear { path, source: e });
  clear(root.join(STAGE_COMPLETE_MARKER))?;
  for rel in staged_paths() {
    clear(root.join(rel))?;
  }

  for rel in staged_paths() {
    let from = src.join(rel);
    let to = root.join(rel);
    debug!(path = %rel, "copying");
    copy_tree(&from, &to, false).map_err(|e| StageError::Copy { from, to, source: e })?;
  }

  let output_hash = write_marker(root)?;
  info!(hash = %output_hash, "staged tree complete");

  Ok(StageResult {
    root: root.to_path_buf(),
    output_hash,
  })
}

fn write_marker(root: &Path) -> Result<ContentHash, StageError> {
  let output_hash = hash_directory(root, STAGE_HASH_EXCLUSIONS)?;
  let marker = StageMarker {
    version: 1,
    output_hash: output_hash.clone(),
  };
  let path = root.join(STAGE_COMPLETE_MARKER);
  let content = serde_json::to_string(&marker).map_err(|e| StageError::WriteMarker {
    path: path.clone(),
    source: e.into(),
  })?;
  std::fs::write(&path, format!("{content}\n")).map_err(|e| StageError::WriteMarker { path, source: e })?;
  Ok(output_hash)
}

/// Read the completion marker. Returns `None` if the tree was never
/// completely staged.
pub fn read_marker(root: &Path) -> Result<Option<StageMarker>, StageError> {
  let path = root.join(STAGE_COMPLETE_MARKER);
  if !path.exists() {
    return Ok(None);
  }

  let content = std::fs::read_to_string(&path).map_err(|e| StageError::ReadMarker {
    path: path.clone(),
    message: e.to_string(),
  })?;
  serde_json::from_str(&content)
    .map(Some)
    .map_err(|e| StageError::ReadMarker {
      path,
      message: e.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
  Intact(ContentHash),
  Modified { expected: ContentHash, actual: ContentHash },
}

impl Verification {
  pub fn is_intact(&self) -> bool {
    matches!(self, Verification::Intact(_))
  }
}

/// Recompute the staged tree's hash and compare it with the marker.
pub fn verify(root: &Path) -> Result<Verification, StageError> {
  let marker = read_marker(root)?.ok_or_else(|| StageError::NotStaged {
    path: root.to_path_buf(),
  })?;
  let actual = hash_directory(root, STAGE_HASH_EXCLUSIONS)?;

  if actual == marker.output_hash {
    Ok(Verification::Intact(actual))
  } else {
    warn!(
      root = %root.display(),
      expected = %marker.output_hash,
      actual = %actual,
      "staged tree modified"
    );
    Ok(Verification::Modified {
      expected: marker.output_hash,
      actual,
    })
  }
}
