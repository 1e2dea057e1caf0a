//! Package recipe parsing and parameter resolution.
//!
//! A recipe is a small TOML document naming the database backend and any
//! launcher environment overrides. Resolution validates it into an immutable
//! [`ResolvedRecipe`]; nothing touches the filesystem until that succeeds.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::env::{builtin_env, merge_env};
use crate::layout::{self, Launcher};

/// Errors that can occur while loading or resolving a recipe.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid database type '{value}': expected one of sqlite, pg")]
  InvalidDatabaseType { value: String },

  #[error("package name must not be empty")]
  EmptyName,

  #[error("invalid package name '{value}': must be a single path component")]
  InvalidName { value: String },

  #[error("failed to read recipe {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to parse recipe: {0}")]
  Parse(#[from] toml::de::Error),
}

/// Database backend the server is built against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
  #[default]
  Sqlite,
  Pg,
}

impl DatabaseType {
  pub const ALL: [DatabaseType; 2] = [DatabaseType::Sqlite, DatabaseType::Pg];

  pub fn as_str(&self) -> &'static str {
    match self {
      DatabaseType::Sqlite => "sqlite",
      DatabaseType::Pg => "pg",
    }
  }
}

impl fmt::Display for DatabaseType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for DatabaseType {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    DatabaseType::ALL
      .into_iter()
      .find(|db| db.as_str() == s)
      .ok_or_else(|| ConfigError::InvalidDatabaseType { value: s.to_string() })
  }
}

fn default_pname() -> String {
  "proxy".to_string()
}

fn default_version() -> String {
  "0.0.0".to_string()
}

fn default_database_type() -> String {
  DatabaseType::default().as_str().to_string()
}

fn default_interpreter() -> String {
  "node".to_string()
}

fn default_script_runner() -> String {
  "npm run".to_string()
}

/// Caller-facing build parameters, as written in the recipe file.
///
/// `database_type` stays a plain string here so that an unknown backend is
/// reported as [`ConfigError::InvalidDatabaseType`] by [`Recipe::resolve`]
/// rather than as a generic parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Recipe {
  #[serde(default = "default_pname")]
  pub pname: String,
  #[serde(default = "default_version")]
  pub version: String,
  #[serde(default = "default_database_type")]
  pub database_type: String,
  #[serde(default)]
  pub environment_variables: BTreeMap<String, String>,
  /// Program used to run the built entry modules.
  #[serde(default = "default_interpreter")]
  pub interpreter: String,
  /// Command prefix for named build scripts (`<runner> <script>`).
  #[serde(default = "default_script_runner")]
  pub script_runner: String,
  /// Locally vendored font that replaces the remote font import.
  #[serde(default)]
  pub font: Option<PathBuf>,
}

impl Default for Recipe {
  fn default() -> Self {
    Self {
      pname: default_pname(),
      version: default_version(),
      database_type: default_database_type(),
      environment_variables: BTreeMap::new(),
      interpreter: default_interpreter(),
      script_runner: default_script_runner(),
      font: None,
    }
  }
}

impl Recipe {
  pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
    Ok(toml::from_str(content)?)
  }

  /// Load a recipe file. A relative `font` path is resolved against the
  /// directory containing the recipe.
  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
      path: path.to_path_buf(),
      source: e,
    })?;
    let mut recipe = Self::from_toml_str(&content)?;

    if let Some(font) = recipe.font.take() {
      let base = path.parent().unwrap_or_else(|| Path::new("."));
      recipe.font = Some(if font.is_relative() { base.join(font) } else { font });
    }

    Ok(recipe)
  }

  /// Validate the recipe and merge the launcher environment.
  pub fn resolve(&self) -> Result<ResolvedRecipe, ConfigError> {
    let database_type: DatabaseType = self.database_type.parse()?;

    if self.pname.trim().is_empty() {
      return Err(ConfigError::EmptyName);
    }
    if !is_single_component(&self.pname) {
      return Err(ConfigError::InvalidName {
        value: self.pname.clone(),
      });
    }

    let env = merge_env(&builtin_env(), &self.environment_variables);
    debug!(pname = %self.pname, database = %database_type, vars = env.len(), "resolved recipe");

    Ok(ResolvedRecipe {
      pname: self.pname.clone(),
      version: self.version.clone(),
      database_type,
      env,
      interpreter: self.interpreter.clone(),
      script_runner: self.script_runner.clone(),
      font: self.font.clone(),
    })
  }
}

/// `name` is usable as one directory or file name under `share/` and `bin/`.
fn is_single_component(name: &str) -> bool {
  let mut components = Path::new(name).components();
  matches!(
    (components.next(), components.next()),
    (Some(Component::Normal(n)), None) if n == name
  )
}

/// A validated recipe. Constructed once per build and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRecipe {
  pub pname: String,
  pub version: String,
  pub database_type: DatabaseType,
  /// Built-in environment overlaid with the recipe's overrides.
  pub env: BTreeMap<String, String>,
  pub interpreter: String,
  pub script_runner: String,
  pub font: Option<PathBuf>,
}

impl ResolvedRecipe {
  pub fn launchers(&self) -> Vec<Launcher> {
    layout::launchers(&self.pname)
  }
}
