//! Generated definitions on disk.
//!
//! Each enabled binding owns exactly one file, `<output-dir>/<addon>.yaml`.
//! Ownership is recorded in the file itself: generated files start with
//! [`GENERATED_MARKER`]. Files without the marker are never treated as
//! generated definitions, so hand-written neighbours in the output
//! directory are not deleted.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::consts::{DEFINITION_EXT, GENERATED_MARKER};
use crate::util::hash::{ContentHash, hash_str};

/// A definition file produced by a previous run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDefinition {
  /// Addon name, taken from the file stem.
  pub name: String,
  pub path: PathBuf,
  pub content: String,
  pub hash: ContentHash,
}

impl GeneratedDefinition {
  pub fn new(name: &str, path: PathBuf, content: String) -> Self {
    let hash = hash_str(&content);
    Self {
      name: name.to_string(),
      path,
      content,
      hash,
    }
  }
}

/// Errors that can occur while scanning the output directory.
#[derive(Debug, Error)]
pub enum ScanError {
  #[error("failed to list {}: {message}", path.display())]
  List { path: PathBuf, message: String },

  #[error("failed to read {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// The generated definitions found in an output directory, keyed by addon name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionSet {
  dir: PathBuf,
  definitions: BTreeMap<String, GeneratedDefinition>,
  unmanaged: Vec<PathBuf>,
}

impl DefinitionSet {
  /// An empty set rooted at `dir`.
  pub fn empty(dir: &Path) -> Self {
    Self {
      dir: dir.to_path_buf(),
      ..Default::default()
    }
  }

  /// Output directory the set belongs to.
  pub fn dir(&self) -> &Path {
    &self.dir
  }

  /// Canonical path of the definition for `name`.
  pub fn path_for(&self, name: &str) -> PathBuf {
    definition_path(&self.dir, name)
  }

  pub fn insert(&mut self, definition: GeneratedDefinition) {
    self.definitions.insert(definition.name.clone(), definition);
  }

  pub fn get(&self, name: &str) -> Option<&GeneratedDefinition> {
    self.definitions.get(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.definitions.contains_key(name)
  }

  /// Definitions sorted by addon name.
  pub fn iter(&self) -> impl Iterator<Item = &GeneratedDefinition> {
    self.definitions.values()
  }

  pub fn len(&self) -> usize {
    self.definitions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.definitions.is_empty()
  }

  /// Files in the output directory that lack the generated marker.
  pub fn unmanaged(&self) -> &[PathBuf] {
    &self.unmanaged
  }
}

/// Canonical path of the definition for `name` under `dir`.
pub fn definition_path(dir: &Path, name: &str) -> PathBuf {
  dir.join(format!("{}.{}", name, DEFINITION_EXT))
}

/// True if `content` was produced by the generator.
pub fn is_generated(content: &str) -> bool {
  content.lines().next() == Some(GENERATED_MARKER)
}

/// Read the generated definitions directly inside `dir`.
///
/// A missing directory is an empty set. Only `*.yaml` files are considered;
/// files without the generated marker are recorded as unmanaged and skipped.
pub fn scan(dir: &Path) -> Result<DefinitionSet, ScanError> {
  let mut set = DefinitionSet::empty(dir);
  if !dir.is_dir() {
    debug!(path = %dir.display(), "output directory does not exist");
    return Ok(set);
  }

  let walker = WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name();
  for entry in walker {
    let entry = entry.map_err(|e| ScanError::List {
      path: dir.to_path_buf(),
      message: e.to_string(),
    })?;
    let path = entry.path();
    if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some(DEFINITION_EXT) {
      continue;
    }
    let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
      continue;
    };

    let bytes = fs::read(path).map_err(|source| ScanError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let content = match String::from_utf8(bytes) {
      Ok(content) => content,
      // A damaged generated file is still ours; it will be rewritten.
      Err(err) if err.as_bytes().starts_with(GENERATED_MARKER.as_bytes()) => {
        String::from_utf8_lossy(err.as_bytes()).into_owned()
      }
      Err(_) => {
        warn!(path = %path.display(), "skipping file that is not valid UTF-8");
        set.unmanaged.push(path.to_path_buf());
        continue;
      }
    };

    if !is_generated(&content) {
      warn!(path = %path.display(), "skipping file without generated marker");
      set.unmanaged.push(path.to_path_buf());
      continue;
    }

    debug!(addon = name, path = %path.display(), "found generated definition");
    set.insert(GeneratedDefinition::new(name, path.to_path_buf(), content));
  }

  Ok(set)
}
