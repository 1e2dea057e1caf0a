//! Implementation of the `pkgwrap check` command.

use std::path::Path;

use anyhow::{Context, Result};

use pkgwrap_lib::config::{Recipe, ResolvedRecipe};

use crate::output::{OutputFormat, print_env, print_json, print_stat, print_success};

/// Load and validate a recipe file.
pub fn load_recipe(path: &Path) -> Result<ResolvedRecipe> {
  let recipe = Recipe::from_file(path).with_context(|| format!("Failed to load recipe: {}", path.display()))?;
  recipe
    .resolve()
    .with_context(|| format!("Invalid recipe: {}", path.display()))
}

/// Resolve the recipe and print the backend, launchers and merged
/// environment without touching the filesystem.
pub fn cmd_check(path: &Path, output: OutputFormat) -> Result<()> {
  let recipe = load_recipe(path)?;

  let launchers = recipe.launchers();

  if output.is_json() {
    let launchers: Vec<_> = launchers
      .iter()
      .map(|l| serde_json::json!({ "artifact": l.artifact, "command": l.command, "bootstrap": l.bootstrap }))
      .collect();
    return print_json(&serde_json::json!({
      "pname": recipe.pname,
      "version": recipe.version,
      "database_type": recipe.database_type.as_str(),
      "interpreter": recipe.interpreter,
      "script_runner": recipe.script_runner,
      "font": recipe.font.as_ref().map(|f| f.display().to_string()),
      "env": recipe.env,
      "launchers": launchers,
    }));
  }

  print_success(&format!("{} {}", recipe.pname, recipe.version));
  print_stat("Database", recipe.database_type.as_str());
  print_stat("Interpreter", &recipe.interpreter);
  print_stat("Script runner", &recipe.script_runner);
  if let Some(font) = &recipe.font {
    print_stat("Font", &font.display().to_string());
  }

  let commands: Vec<_> = launchers.iter().map(|l| l.command.as_str()).collect();
  print_stat("Launchers", &commands.join(", "));

  println!();
  print_env("Environment", &recipe.env);

  Ok(())
}
