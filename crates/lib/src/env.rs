//! Environment variable sets for the generated launchers.
//!
//! The launcher environment is a left-to-right overlay: the built-in defaults
//! first, then whatever the recipe supplies. Keys are never validated.

use std::collections::BTreeMap;

/// Built-in launcher environment.
pub const BUILTIN_ENV: &[(&str, &str)] = &[
  // Source maps for readable stack traces from the bundled server
  ("NODE_OPTIONS", "--enable-source-maps"),
  ("NODE_ENV", "production"),
  ("ENVIRONMENT", "production"),
];

/// Returns the built-in launcher environment as an owned map.
pub fn builtin_env() -> BTreeMap<String, String> {
  BUILTIN_ENV
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Overlay `overlay` on top of `base`.
///
/// Entries from `overlay` replace entries of `base` with the same key; all
/// other entries of both maps are kept.
pub fn merge_env(base: &BTreeMap<String, String>, overlay: &BTreeMap<String, String>) -> BTreeMap<String, String> {
  let mut merged = base.clone();
  merged.extend(overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
  merged
}
