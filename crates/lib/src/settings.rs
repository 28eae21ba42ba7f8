//! Location settings for a run.
//!
//! Every path is resolved in the same order: explicit override, then the
//! matching `APPSETGEN_*` environment variable, then the built-in
//! repository-relative default. Relative paths are taken relative to the
//! repository root.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::consts::{
  CATALOG_DIR_ENV, DEFAULT_CATALOG_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_POLICY_PATH, OUTPUT_DIR_ENV, POLICY_ENV,
};

/// Explicitly requested locations, typically from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
  pub policy: Option<PathBuf>,
  pub output_dir: Option<PathBuf>,
  pub catalog_dir: Option<PathBuf>,
}

/// Resolved locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
  pub root: PathBuf,
  pub policy: PathBuf,
  pub output_dir: PathBuf,
  pub catalog_dir: PathBuf,
}

impl Settings {
  /// Resolve settings for the repository at `root`.
  pub fn resolve(root: &Path, overrides: &SettingsOverrides) -> Self {
    let root = dunce::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());

    let settings = Self {
      policy: pick(&root, overrides.policy.as_deref(), POLICY_ENV, DEFAULT_POLICY_PATH),
      output_dir: pick(&root, overrides.output_dir.as_deref(), OUTPUT_DIR_ENV, DEFAULT_OUTPUT_DIR),
      catalog_dir: pick(&root, overrides.catalog_dir.as_deref(), CATALOG_DIR_ENV, DEFAULT_CATALOG_DIR),
      root,
    };
    debug!(?settings, "resolved settings");
    settings
  }
}

fn pick(root: &Path, explicit: Option<&Path>, env: &str, default: &str) -> PathBuf {
  let chosen = match explicit {
    Some(path) => path.to_path_buf(),
    None => std::env::var_os(env)
      .filter(|v| !v.is_empty())
      .map(PathBuf::from)
      .unwrap_or_else(|| PathBuf::from(default)),
  };
  if chosen.is_absolute() { chosen } else { root.join(chosen) }
}
