//! Implementation of the `pkgwrap build` and `pkgwrap install` commands.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use tracing::debug;

use pkgwrap_lib::config::ResolvedRecipe;
use pkgwrap_lib::package::{self, BuildOptions, PackageResult};

use super::check::load_recipe;
use crate::output::{format_duration, print_info, print_stat, print_success, symbols, truncate_hash};

/// The running executable, referenced by the generated shims.
fn launcher_bin() -> Result<PathBuf> {
  let exe = std::env::current_exe().context("Failed to locate the pkgwrap executable")?;
  let exe = dunce::canonicalize(&exe).unwrap_or(exe);
  debug!(path = %exe.display(), "resolved launcher binary");
  Ok(exe)
}

fn options(src: &Path, out: &Path, run_scripts: bool) -> Result<BuildOptions> {
  Ok(BuildOptions {
    src: src.to_path_buf(),
    out: out.to_path_buf(),
    run_scripts,
    launcher_bin: launcher_bin()?,
  })
}

/// Patch the source tree, run the build scripts, then stage and wrap.
pub fn cmd_build(recipe: &Path, src: &Path, out: &Path, run_scripts: bool) -> Result<()> {
  let start = Instant::now();
  let recipe = load_recipe(recipe)?;
  let options = options(src, out, run_scripts)?;
  if !run_scripts {
    print_info("Skipping build scripts");
  }

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let result = rt
    .block_on(package::build(&recipe, &options))
    .context("Build failed")?;

  print_summary("Built", &recipe, &result);
  print_stat("Time", &format_duration(start.elapsed()));
  Ok(())
}

/// Stage an already built source tree and generate launchers.
pub fn cmd_install(recipe: &Path, src: &Path, out: &Path) -> Result<()> {
  let recipe = load_recipe(recipe)?;
  let options = options(src, out, false)?;

  let result = package::install(&recipe, &options).context("Install failed")?;

  print_summary("Installed", &recipe, &result);
  Ok(())
}

fn print_summary(verb: &str, recipe: &ResolvedRecipe, result: &PackageResult) {
  print_success(&format!("{} {} {}", verb, recipe.pname, recipe.version));
  print_stat("Staged", &result.stage.root.display().to_string());
  print_stat("Hash", truncate_hash(&result.stage.output_hash.0));
  for wrapper in &result.wrap.wrappers {
    println!(
      "  {} {}",
      symbols::ARROW.if_supports_color(Stream::Stdout, |s| s.cyan()),
      wrapper.display()
    );
  }
}
