//! Source transformation: vendoring the font and running build scripts.
//!
//! The upstream stylesheet pulls its font from a remote CDN, which is not
//! reachable from a sandboxed build. The import is rewritten to an
//! `@font-face` rule pointing at a font copied into the static assets. After
//! that the backend-selection, code-generation and build scripts run in order.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::DatabaseType;
use crate::layout::{FONT_DIR, FONT_URL_PREFIX, STYLESHEET_PATH};

/// Host of the remote font stylesheet that gets replaced.
pub const REMOTE_FONT_HOST: &str = "fonts.googleapis.com";

#[derive(Debug, Error)]
pub enum SourceError {
  #[error("stylesheet not found: {}", path.display())]
  StylesheetMissing { path: PathBuf },

  #[error("font file not found: {}", path.display())]
  FontMissing { path: PathBuf },

  #[error("no remote font import to replace in {}", path.display())]
  NoRemoteImport { path: PathBuf },

  #[error("failed to patch {}: {source}", path.display())]
  Patch { path: PathBuf, source: std::io::Error },

  #[error("script '{script}' failed with exit code {code:?}")]
  ScriptFailed { script: String, code: Option<i32> },

  #[error("failed to spawn script '{script}': {source}")]
  Spawn { script: String, source: std::io::Error },
}

/// Rewrite every `@import` line that references the remote font host into a
/// local `@font-face` rule. Returns `None` if there was nothing to replace.
pub fn rewrite_font_imports(css: &str, font_file: &str) -> Option<String> {
  let face = font_face_rule(font_file);
  let mut replaced = false;

  let lines: Vec<String> = css
    .lines()
    .map(|line| {
      let trimmed = line.trim_start();
      if trimmed.starts_with("@import") && trimmed.contains(REMOTE_FONT_HOST) {
        replaced = true;
        face.clone()
      } else {
        line.to_string()
      }
    })
    .collect();

  if !replaced {
    return None;
  }

  let mut out = lines.join("\n");
  if css.ends_with('\n') {
    out.push('\n');
  }
  Some(out)
}

fn font_face_rule(font_file: &str) -> String {
  let path = Path::new(font_file);
  let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(font_file);
  // "Inter-Regular" -> "Inter"
  let family = stem.split('-').next().unwrap_or(stem);
  let format = match path.extension().and_then(|e| e.to_str()) {
    Some("woff2") => "woff2",
    Some("woff") => "woff",
    Some("otf") => "opentype",
    _ => "truetype",
  };

  format!(
    "@font-face {{ font-family: '{family}'; src: url('{FONT_URL_PREFIX}/{font_file}') format('{format}'); font-display: swap; }}"
  )
}

/// Vendor `font` into `src` and point the stylesheet at it.
///
/// Returns the path of the copied font inside the source tree.
pub fn patch_font_import(src: &Path, font: &Path) -> Result<PathBuf, SourceError> {
  let stylesheet = src.join(STYLESHEET_PATH);
  if !stylesheet.is_file() {
    return Err(SourceError::StylesheetMissing { path: stylesheet });
  }

  let font_name = match (font.is_file(), font.file_name().and_then(|n| n.to_str())) {
    (true, Some(name)) => name.to_string(),
    _ => return Err(SourceError::FontMissing { path: font.to_path_buf() }),
  };

  let css = std::fs::read_to_string(&stylesheet).map_err(|e| SourceError::Patch {
    path: stylesheet.clone(),
    source: e,
  })?;
  let patched =
    rewrite_font_imports(&css, &font_name).ok_or_else(|| SourceError::NoRemoteImport { path: stylesheet.clone() })?;

  let font_dir = src.join(FONT_DIR);
  let vendored = font_dir.join(&font_name);
  let patch_err = |path: &Path| {
    let path = path.to_path_buf();
    move |e| SourceError::Patch { path, source: e }
  };
  std::fs::create_dir_all(&font_dir).map_err(patch_err(&font_dir))?;
  std::fs::copy(font, &vendored).map_err(patch_err(&vendored))?;
  std::fs::write(&stylesheet, patched).map_err(patch_err(&stylesheet))?;

  info!(font = %font_name, stylesheet = %stylesheet.display(), "vendored font");
  Ok(vendored)
}

/// Named scripts to run for a backend, in order: backend selection, code
/// generation, build.
pub fn build_scripts(database: DatabaseType) -> Vec<String> {
  vec![format!("db:{}", database), "db:generate".to_string(), "build".to_string()]
}

/// Get the shell used to invoke scripts.
fn shell() -> (&'static str, &'static str) {
  #[cfg(unix)]
  {
    ("/bin/sh", "-c")
  }
  #[cfg(windows)]
  {
    ("cmd.exe", "/C")
  }
}

/// Run `<runner> <script>` in `src`, inheriting stdio.
pub async fn run_script(src: &Path, runner: &str, script: &str) -> Result<(), SourceError> {
  let line = format!("{runner} {script}");
  let (shell, flag) = shell();
  info!(cmd = %line, "running build script");

  let status = Command::new(shell)
    .arg(flag)
    .arg(&line)
    .current_dir(src)
    .status()
    .await
    .map_err(|e| SourceError::Spawn {
      script: script.to_string(),
      source: e,
    })?;

  if !status.success() {
    return Err(SourceError::ScriptFailed {
      script: script.to_string(),
      code: status.code(),
    });
  }

  debug!(script = %script, "script finished");
  Ok(())
}

/// Run scripts in sequence; the first failure stops the rest.
pub async fn run_scripts(src: &Path, runner: &str, scripts: &[String]) -> Result<(), SourceError> {
  for script in scripts {
    run_script(src, runner, script).await?;
  }
  Ok(())
}
