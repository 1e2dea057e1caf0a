//! End-to-end packaging: source transformation, staging and wrapping.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::config::ResolvedRecipe;
use crate::layout::share_dir;
use crate::source::{self, SourceError};
use crate::stage::{self, StageError, StageResult};
use crate::wrap::{self, WrapError, WrapResult};

#[derive(Debug, Error)]
pub enum PackageError {
  #[error(transparent)]
  Source(#[from] SourceError),

  #[error(transparent)]
  Stage(#[from] StageError),

  #[error(transparent)]
  Wrap(#[from] WrapError),

  #[error("failed to resolve output directory {}: {source}", path.display())]
  OutputDir { path: PathBuf, source: std::io::Error },
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
  /// Fetched upstream source tree.
  pub src: PathBuf,
  /// Output directory receiving `bin/` and `share/<pname>/`.
  pub out: PathBuf,
  /// Run the backend, code-generation and build scripts. Disable when `src`
  /// already holds build outputs.
  pub run_scripts: bool,
  /// `pkgwrap` executable referenced by the generated shims.
  pub launcher_bin: PathBuf,
}

#[derive(Debug, Clone)]
pub struct PackageResult {
  pub stage: StageResult,
  pub wrap: WrapResult,
}

/// Vendor the font (when the recipe names one) and run the build scripts.
pub async fn prepare_source(recipe: &ResolvedRecipe, options: &BuildOptions) -> Result<(), PackageError> {
  match &recipe.font {
    Some(font) => {
      source::patch_font_import(&options.src, font)?;
    }
    None => warn!("no font configured, leaving remote font import in place"),
  }

  if options.run_scripts {
    let scripts = source::build_scripts(recipe.database_type);
    source::run_scripts(&options.src, &recipe.script_runner, &scripts).await?;
  }

  Ok(())
}

/// Stage the build outputs and generate launchers.
pub fn install(recipe: &ResolvedRecipe, options: &BuildOptions) -> Result<PackageResult, PackageError> {
  std::fs::create_dir_all(&options.out).map_err(|e| PackageError::OutputDir {
    path: options.out.clone(),
    source: e,
  })?;
  let out = absolute(&options.out)?;
  let root = share_dir(&out, &recipe.pname);

  let stage = stage::stage(&options.src, &root)?;
  let plan = wrap::launch_plan(recipe, &stage.root)?;
  let wrap = wrap::write_wrappers(&plan, &out, &options.launcher_bin)?;

  info!(
    pname = %recipe.pname,
    version = %recipe.version,
    database = %recipe.database_type,
    out = %out.display(),
    "package installed"
  );

  Ok(PackageResult { stage, wrap })
}

/// Full build: [`prepare_source`] then [`install`].
pub async fn build(recipe: &ResolvedRecipe, options: &BuildOptions) -> Result<PackageResult, PackageError> {
  prepare_source(recipe, options).await?;
  install(recipe, options)
}

fn absolute(path: &Path) -> Result<PathBuf, PackageError> {
  dunce::canonicalize(path).map_err(|e| PackageError::OutputDir {
    path: path.to_path_buf(),
    source: e,
  })
}
