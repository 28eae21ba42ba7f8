//! Validation rules for promotion policies.
//!
//! Every rule reports a [`ValidationError`] that names the offending field and
//! the addon it belongs to. Bindings without a usable name are identified by
//! their 1-based position (`#3`); errors in the global defaults use
//! `defaults`.

use thiserror::Error;

/// Scope label for errors raised while checking the global defaults.
pub const DEFAULTS_SCOPE: &str = "defaults";

/// Fields an addon binding may declare.
pub const BINDING_FIELDS: &[&str] = &["name", "namespace", "selector", "enabled", "chart", "repoURL", "version"];

/// A policy that is malformed or internally inconsistent.
///
/// Validation errors are fatal: nothing is planned or written for a policy
/// that fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  /// The same addon name is declared more than once.
  #[error("addon '{addon}': duplicate addon name (field `name`)")]
  DuplicateName { addon: String },

  /// A required field is absent.
  #[error("addon '{addon}': missing required field `{field}`")]
  MissingField { addon: String, field: String },

  /// A field is present but its value is not acceptable.
  #[error("addon '{addon}': field `{field}` is malformed: {reason}")]
  Malformed {
    addon: String,
    field: String,
    reason: String,
  },

  /// A binding declares a field the schema does not know.
  #[error("addon '{addon}': unknown field `{field}`")]
  UnknownField { addon: String, field: String },

  /// The addon sources its chart from the catalog but the catalog has no such entry.
  #[error("addon '{addon}': field `name` does not match any catalog entry")]
  NotInCatalog { addon: String },
}

impl ValidationError {
  /// The addon identifier (or positional label) the error refers to.
  pub fn addon(&self) -> &str {
    match self {
      ValidationError::DuplicateName { addon }
      | ValidationError::MissingField { addon, .. }
      | ValidationError::Malformed { addon, .. }
      | ValidationError::UnknownField { addon, .. }
      | ValidationError::NotInCatalog { addon } => addon,
    }
  }

  /// The offending field.
  pub fn field(&self) -> &str {
    match self {
      ValidationError::DuplicateName { .. } | ValidationError::NotInCatalog { .. } => "name",
      ValidationError::MissingField { field, .. }
      | ValidationError::Malformed { field, .. }
      | ValidationError::UnknownField { field, .. } => field,
    }
  }
}

/// Positional label for a binding that has no usable name.
pub fn positional_label(index: usize) -> String {
  format!("#{}", index + 1)
}

/// Check an addon identifier: lowercase alphanumeric words joined by single hyphens.
pub fn check_addon_name(name: &str) -> Result<(), String> {
  if name.is_empty() {
    return Err("must not be empty".to_string());
  }
  check_hyphenated(name)
}

/// Check a Kubernetes namespace (DNS-1123 label).
pub fn check_namespace(namespace: &str) -> Result<(), String> {
  if namespace.is_empty() {
    return Err("must not be empty".to_string());
  }
  if namespace.len() > 63 {
    return Err(format!("must be at most 63 characters, got {}", namespace.len()));
  }
  check_hyphenated(namespace)
}

fn check_hyphenated(value: &str) -> Result<(), String> {
  if let Some(c) = value.chars().find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')) {
    return Err(format!(
      "'{}' contains '{}'; only lowercase letters, digits and '-' are allowed",
      value, c
    ));
  }
  if value.starts_with('-') || value.ends_with('-') {
    return Err(format!("'{}' must not start or end with '-'", value));
  }
  if value.contains("--") {
    return Err(format!("'{}' must not contain consecutive '-'", value));
  }
  Ok(())
}
