//! Filesystem helpers shared by staging and the launcher asset sync.

use std::fs;
use std::io;
use std::path::Path;

use tracing::trace;
use walkdir::WalkDir;

/// Cross-platform symlink creation.
pub fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
  #[cfg(unix)]
  {
    std::os::unix::fs::symlink(target, link)
  }
  #[cfg(windows)]
  {
    if target.is_dir() {
      std::os::windows::fs::symlink_dir(target, link)
    } else {
      std::os::windows::fs::symlink_file(target, link)
    }
  }
}

/// Remove whatever exists at `path`: file, symlink or directory tree.
///
/// A symlink is removed itself, never its target. A missing path is not an
/// error.
pub fn remove_path(path: &Path) -> io::Result<()> {
  let metadata = match fs::symlink_metadata(path) {
    Ok(m) => m,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
    Err(e) => return Err(e),
  };

  if metadata.is_dir() {
    fs::remove_dir_all(path)
  } else {
    #[cfg(windows)]
    if metadata.file_type().is_symlink() && path.is_dir() {
      return fs::remove_dir(path);
    }
    fs::remove_file(path)
  }
}

/// Recursively copy `from` to `to`.
///
/// Symlinks are recreated with the same target rather than followed. When
/// `writable` is set, copied files get owner write permission so a later
/// [`remove_path`] or in-place edit works even when the source is read-only.
pub fn copy_tree(from: &Path, to: &Path, writable: bool) -> io::Result<()> {
  if from.is_file() {
    if let Some(parent) = to.parent() {
      fs::create_dir_all(parent)?;
    }
    return copy_file(from, to, writable);
  }

  for entry in WalkDir::new(from).sort_by_file_name() {
    let entry = entry.map_err(io::Error::other)?;
    let rel = entry.path().strip_prefix(from).map_err(io::Error::other)?;
    let dest = to.join(rel);
    let file_type = entry.file_type();

    if file_type.is_symlink() {
      let target = fs::read_link(entry.path())?;
      create_symlink(&target, &dest)?;
    } else if file_type.is_dir() {
      fs::create_dir_all(&dest)?;
    } else {
      copy_file(entry.path(), &dest, writable)?;
    }
  }

  trace!(from = ?from, to = ?to, "copied tree");
  Ok(())
}

fn copy_file(from: &Path, to: &Path, writable: bool) -> io::Result<()> {
  fs::copy(from, to)?;
  if writable {
    let mut perms = fs::metadata(to)?.permissions();
    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      perms.set_mode(perms.mode() | 0o200);
    }
    #[cfg(not(unix))]
    #[allow(clippy::permissions_set_readonly_false)]
    perms.set_readonly(false);
    fs::set_permissions(to, perms)?;
  }
  Ok(())
}

/// Write `contents` to a new file readable and writable by the owner only.
///
/// Fails if the file already exists.
pub fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
  use std::io::Write;

  let mut options = fs::OpenOptions::new();
  options.write(true).create_new(true);
  #[cfg(unix)]
  {
    use std::os::unix::fs::OpenOptionsExt;
    options.mode(0o600);
  }
  let mut file = options.open(path)?;
  file.write_all(contents)?;
  file.sync_all()
}
