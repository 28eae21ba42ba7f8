//! Promotion-policy loading.
//!
//! The promotion policy is the single source of truth for which addons are
//! promoted and where. It is read fresh on every invocation and validated
//! before anything downstream runs.
//!
//! # Policy Format
//!
//! ```yaml
//! version: 1
//! defaults:
//!   namespace: addons
//!   selector:
//!     environment: dev
//! addons:
//!   - name: argo-cd
//!     namespace: argocd
//!   - name: cert-manager
//!     enabled: false
//! ```

pub mod validate;

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::consts::{DEFAULT_APPSET_NAMESPACE, DEFAULT_CATALOG_DIR, DEFAULT_PROJECT, POLICY_VERSION};

pub use validate::ValidationError;
use validate::{BINDING_FIELDS, DEFAULTS_SCOPE, check_addon_name, check_namespace, positional_label};

/// The validated desired state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromotionPolicy {
  /// Global defaults inherited by every binding.
  pub defaults: PolicyDefaults,
  /// Bindings in declared order. Names are unique.
  pub bindings: Vec<AddonBinding>,
}

/// Global defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PolicyDefaults {
  /// Target namespace for bindings that do not name one.
  #[serde(default)]
  pub namespace: Option<String>,

  /// Cluster label selector; binding selectors are merged over it.
  #[serde(default)]
  pub selector: BTreeMap<String, String>,

  /// Argo CD project for generated applications.
  #[serde(default)]
  pub project: Option<String>,

  /// Namespace the ApplicationSet objects themselves live in.
  #[serde(default)]
  pub appset_namespace: Option<String>,

  /// Repository path of the chart catalog, as seen by the delivery controller.
  #[serde(default)]
  pub chart_path: Option<String>,
}

impl PolicyDefaults {
  pub fn project(&self) -> &str {
    self.project.as_deref().unwrap_or(DEFAULT_PROJECT)
  }

  pub fn appset_namespace(&self) -> &str {
    self.appset_namespace.as_deref().unwrap_or(DEFAULT_APPSET_NAMESPACE)
  }

  pub fn chart_path(&self) -> &str {
    self.chart_path.as_deref().unwrap_or(DEFAULT_CATALOG_DIR).trim_end_matches('/')
  }
}

/// One addon's desired deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonBinding {
  pub name: String,
  /// Explicit namespace; `None` inherits [`PolicyDefaults::namespace`].
  pub namespace: Option<String>,
  /// Binding-specific selector labels.
  pub selector: BTreeMap<String, String>,
  pub enabled: bool,
  /// Chart name in an external Helm repository. Defaults to the addon name.
  pub chart: Option<String>,
  /// External Helm repository. When absent the chart comes from the catalog.
  pub repo_url: Option<String>,
  /// Chart version for external Helm sources.
  pub version: Option<String>,
}

impl AddonBinding {
  /// Create an enabled binding with no overrides.
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_string(),
      namespace: None,
      selector: BTreeMap::new(),
      enabled: true,
      chart: None,
      repo_url: None,
      version: None,
    }
  }

  pub fn with_namespace(mut self, namespace: &str) -> Self {
    self.namespace = Some(namespace.to_string());
    self
  }

  pub fn with_enabled(mut self, enabled: bool) -> Self {
    self.enabled = enabled;
    self
  }

  pub fn with_selector(mut self, key: &str, value: &str) -> Self {
    self.selector.insert(key.to_string(), value.to_string());
    self
  }

  /// True when any external Helm source field is set.
  pub fn uses_external_chart(&self) -> bool {
    self.chart.is_some() || self.repo_url.is_some() || self.version.is_some()
  }
}

impl PromotionPolicy {
  /// Parse and validate a policy from YAML text.
  pub fn from_yaml(content: &str) -> Result<Self, PolicyError> {
    let value: Value = serde_yaml::from_str(content).map_err(PolicyError::Parse)?;
    let document = match value {
      Value::Null => PolicyDocument::default(),
      other => serde_yaml::from_value::<PolicyDocument>(other).map_err(PolicyError::Parse)?,
    };

    match document.version {
      Some(version) if version != POLICY_VERSION => return Err(PolicyError::UnsupportedVersion(version)),
      _ => {}
    }

    let defaults = document.defaults.unwrap_or_default();
    if let Some(ref namespace) = defaults.namespace {
      check_namespace(namespace).map_err(|reason| ValidationError::Malformed {
        addon: DEFAULTS_SCOPE.to_string(),
        field: "namespace".to_string(),
        reason,
      })?;
    }

    let mut bindings = Vec::new();
    let mut seen = HashSet::new();
    for (index, entry) in document.addons.unwrap_or_default().into_iter().enumerate() {
      let binding = binding_from_value(index, entry)?;
      if !seen.insert(binding.name.clone()) {
        return Err(ValidationError::DuplicateName { addon: binding.name }.into());
      }
      debug!(addon = %binding.name, enabled = binding.enabled, "loaded binding");
      bindings.push(binding);
    }

    Ok(Self { defaults, bindings })
  }

  /// Enabled bindings in declared order.
  pub fn enabled(&self) -> impl Iterator<Item = &AddonBinding> {
    self.bindings.iter().filter(|b| b.enabled)
  }

  /// Look up a binding by name.
  pub fn get(&self, name: &str) -> Option<&AddonBinding> {
    self.bindings.iter().find(|b| b.name == name)
  }

  /// Namespace a binding deploys into, after inheriting the default.
  pub fn resolved_namespace<'a>(&'a self, binding: &'a AddonBinding) -> Option<&'a str> {
    binding.namespace.as_deref().or(self.defaults.namespace.as_deref())
  }

  /// Effective selector: defaults overlaid with the binding's labels.
  pub fn resolved_selector(&self, binding: &AddonBinding) -> BTreeMap<String, String> {
    let mut selector = self.defaults.selector.clone();
    selector.extend(binding.selector.iter().map(|(k, v)| (k.clone(), v.clone())));
    selector
  }
}

/// Errors that can occur while loading a policy.
#[derive(Debug, Error)]
pub enum PolicyError {
  /// Failed to read the policy file.
  #[error("failed to read policy {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The document is not well-formed YAML or does not match the schema.
  #[error("failed to parse policy: {0}")]
  Parse(#[source] serde_yaml::Error),

  /// Policy schema version is not supported.
  #[error("unsupported policy version {0}, expected {POLICY_VERSION}")]
  UnsupportedVersion(u32),

  /// The document parsed but is inconsistent.
  #[error("invalid policy: {0}")]
  Invalid(#[from] ValidationError),
}

impl PolicyError {
  /// The validation failure, if this is one.
  pub fn validation(&self) -> Option<&ValidationError> {
    match self {
      PolicyError::Invalid(err) => Some(err),
      _ => None,
    }
  }
}

/// Load and validate the promotion policy at `path`.
pub fn load(path: &Path) -> Result<PromotionPolicy, PolicyError> {
  info!(path = %path.display(), "loading promotion policy");

  let content = fs::read_to_string(path).map_err(|source| PolicyError::Read {
    path: path.to_path_buf(),
    source,
  })?;

  let policy = PromotionPolicy::from_yaml(&content)?;
  info!(
    bindings = policy.bindings.len(),
    enabled = policy.enabled().count(),
    "promotion policy loaded"
  );
  Ok(policy)
}

/// Top-level document shape. Bindings stay untyped so their errors can name
/// the field and addon.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyDocument {
  #[serde(default)]
  version: Option<u32>,
  #[serde(default)]
  defaults: Option<PolicyDefaults>,
  #[serde(default)]
  addons: Option<Vec<Value>>,
}

fn binding_from_value(index: usize, value: Value) -> Result<AddonBinding, ValidationError> {
  let label = positional_label(index);
  let Value::Mapping(mapping) = value else {
    return Err(ValidationError::Malformed {
      addon: label,
      field: "addons".to_string(),
      reason: "expected a mapping".to_string(),
    });
  };

  let name = match mapping.get("name") {
    None | Some(Value::Null) => {
      return Err(ValidationError::MissingField {
        addon: label,
        field: "name".to_string(),
      });
    }
    Some(Value::String(name)) => name.clone(),
    Some(_) => {
      return Err(ValidationError::Malformed {
        addon: label,
        field: "name".to_string(),
        reason: "expected a string".to_string(),
      });
    }
  };
  check_addon_name(&name).map_err(|reason| ValidationError::Malformed {
    addon: if name.is_empty() { label.clone() } else { name.clone() },
    field: "name".to_string(),
    reason,
  })?;

  for key in mapping.keys() {
    match key.as_str() {
      Some(field) if BINDING_FIELDS.contains(&field) => {}
      Some(field) => {
        return Err(ValidationError::UnknownField {
          addon: name,
          field: field.to_string(),
        });
      }
      None => {
        return Err(ValidationError::UnknownField {
          addon: name,
          field: format!("{:?}", key),
        });
      }
    }
  }

  let namespace = optional_scalar(&mapping, &name, "namespace")?;
  if let Some(ref namespace) = namespace {
    check_namespace(namespace).map_err(|reason| ValidationError::Malformed {
      addon: name.clone(),
      field: "namespace".to_string(),
      reason,
    })?;
  }

  let enabled = match mapping.get("enabled") {
    None | Some(Value::Null) => true,
    Some(Value::Bool(enabled)) => *enabled,
    Some(_) => {
      return Err(ValidationError::Malformed {
        addon: name,
        field: "enabled".to_string(),
        reason: "expected true or false".to_string(),
      });
    }
  };

  let selector = match mapping.get("selector") {
    None | Some(Value::Null) => BTreeMap::new(),
    Some(Value::Mapping(labels)) => selector_labels(labels, &name)?,
    Some(_) => {
      return Err(ValidationError::Malformed {
        addon: name,
        field: "selector".to_string(),
        reason: "expected a mapping of labels".to_string(),
      });
    }
  };

  let chart = optional_scalar(&mapping, &name, "chart")?;
  let repo_url = optional_scalar(&mapping, &name, "repoURL")?;
  let version = optional_scalar(&mapping, &name, "version")?;

  Ok(AddonBinding {
    name,
    namespace,
    selector,
    enabled,
    chart,
    repo_url,
    version,
  })
}

fn selector_labels(labels: &Mapping, addon: &str) -> Result<BTreeMap<String, String>, ValidationError> {
  let mut selector = BTreeMap::new();
  for (key, value) in labels {
    let (Some(key), Some(value)) = (scalar_string(key), scalar_string(value)) else {
      return Err(ValidationError::Malformed {
        addon: addon.to_string(),
        field: "selector".to_string(),
        reason: "label keys and values must be scalars".to_string(),
      });
    };
    selector.insert(key, value);
  }
  Ok(selector)
}

fn optional_scalar(mapping: &Mapping, addon: &str, field: &str) -> Result<Option<String>, ValidationError> {
  let malformed = |reason: &str| ValidationError::Malformed {
    addon: addon.to_string(),
    field: field.to_string(),
    reason: reason.to_string(),
  };
  match mapping.get(field) {
    None | Some(Value::Null) => Ok(None),
    Some(Value::String(s)) if s.is_empty() => Err(malformed("must not be empty")),
    Some(Value::String(s)) => Ok(Some(s.clone())),
    // `1.10` would come back as `1.1`; only the text as written is usable.
    Some(Value::Number(_) | Value::Bool(_)) => Err(malformed("quote the value")),
    Some(_) => Err(malformed("expected a string")),
  }
}

/// Label keys and values as strings. Floats are rejected since their text
/// does not survive parsing.
fn scalar_string(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}
