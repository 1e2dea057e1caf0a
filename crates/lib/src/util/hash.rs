//! Content hashing for staged trees.
//!
//! The staged distribution records a hash of its contents when it is
//! assembled, and the launcher asset sync is checked against the same hash in
//! tests. Only content, structure and symlink targets contribute; timestamps
//! and permissions do not.

use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

/// A full 64-character SHA-256 hex digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

#[derive(Debug, thiserror::Error)]
pub enum DirHashError {
  #[error("failed to walk {path}: {source}")]
  Walk {
    path: String,
    #[source]
    source: walkdir::Error,
  },

  #[error("failed to read {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },
}

/// Hash the contents of `root`, skipping the top-level entries named in
/// `exclude`. Entries with those names deeper in the tree are hashed.
///
/// Symlinks are hashed by target and never followed, so a tree of links into
/// another tree hashes differently from a copy of it.
pub fn hash_directory(root: &Path, exclude: &[&str]) -> Result<ContentHash, DirHashError> {
  let walker = WalkDir::new(root)
    .min_depth(1)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|e| e.depth() != 1 || e.file_name().to_str().is_none_or(|name| !exclude.contains(&name)));

  let mut hasher = Sha256::new();

  for entry in walker {
    let entry = entry.map_err(|e| DirHashError::Walk {
      path: root.display().to_string(),
      source: e,
    })?;
    let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
    let rel = rel.to_string_lossy();
    let file_type = entry.file_type();

    let line = if file_type.is_symlink() {
      let target = fs::read_link(entry.path()).map_err(|e| DirHashError::Read {
        path: entry.path().display().to_string(),
        source: e,
      })?;
      format!("L {} {}", rel, hash_bytes(target.to_string_lossy().as_bytes()))
    } else if file_type.is_dir() {
      format!("D {}", rel)
    } else if file_type.is_file() {
      format!("F {} {}", rel, hash_file(entry.path())?)
    } else {
      continue;
    };

    hasher.update(line.as_bytes());
    hasher.update(b"\n");
  }

  Ok(ContentHash(format!("{:x}", hasher.finalize())))
}

pub fn hash_file(path: &Path) -> Result<ContentHash, DirHashError> {
  let read_err = |e| DirHashError::Read {
    path: path.display().to_string(),
    source: e,
  };
  let mut file = fs::File::open(path).map_err(read_err)?;
  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];

  loop {
    let n = file.read(&mut buffer).map_err(read_err)?;
    if n == 0 {
      break;
    }
    hasher.update(&buffer[..n]);
  }

  Ok(ContentHash(format!("{:x}", hasher.finalize())))
}

pub fn hash_bytes(data: &[u8]) -> ContentHash {
  ContentHash(format!("{:x}", Sha256::digest(data)))
}
