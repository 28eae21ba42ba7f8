//! The addon chart catalog.
//!
//! The catalog is static reference data; the generator only needs the list of
//! addon identifiers it provides, which is the set of chart directories
//! directly under the catalog root.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use crate::policy::{PromotionPolicy, ValidationError};

/// Errors that can occur while reading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("failed to read catalog {}: {message}", path.display())]
  Read { path: PathBuf, message: String },
}

/// Addon identifiers known to the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
  entries: BTreeSet<String>,
}

impl Catalog {
  /// Read the catalog rooted at `dir`.
  ///
  /// Returns `Ok(None)` when the directory does not exist.
  pub fn load(dir: &Path) -> Result<Option<Self>, CatalogError> {
    if !dir.is_dir() {
      return Ok(None);
    }

    let mut entries = BTreeSet::new();
    let walker = WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name();
    for entry in walker {
      let entry = entry.map_err(|e| CatalogError::Read {
        path: dir.to_path_buf(),
        message: e.to_string(),
      })?;
      if !entry.file_type().is_dir() {
        continue;
      }
      match entry.file_name().to_str() {
        Some(name) if !name.starts_with('.') => {
          entries.insert(name.to_string());
        }
        _ => {}
      }
    }

    debug!(path = %dir.display(), entries = entries.len(), "catalog loaded");
    Ok(Some(Self { entries }))
  }

  pub fn contains(&self, name: &str) -> bool {
    self.entries.contains(name)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.entries.iter().map(String::as_str)
  }
}

impl<S: Into<String>> FromIterator<S> for Catalog {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    Self {
      entries: iter.into_iter().map(Into::into).collect(),
    }
  }
}

/// Check that every binding sourced from the catalog names a catalog entry.
///
/// Disabled bindings and bindings that pull their chart from an external Helm
/// repository are not checked; a retired chart can be disabled after it left
/// the catalog so its definition gets deleted.
pub fn validate_catalog(policy: &PromotionPolicy, catalog: &Catalog) -> Result<(), ValidationError> {
  for binding in &policy.bindings {
    if !binding.enabled || binding.uses_external_chart() {
      continue;
    }
    if !catalog.contains(&binding.name) {
      return Err(ValidationError::NotInCatalog {
        addon: binding.name.clone(),
      });
    }
  }
  Ok(())
}
