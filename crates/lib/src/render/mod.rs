//! Canonical rendering of addon bindings into ApplicationSet definitions.
//!
//! Rendering is a pure function of the policy and one binding. The output is
//! byte-identical across runs: struct field order fixes key order, maps are
//! sorted, and the header is constant. The planner relies on this to detect
//! no-op entries by comparing content.
//!
//! Addons from the chart catalog are sourced from the addons repository the
//! target cluster is annotated with; addons with `repoURL` set are sourced
//! from that Helm repository at the pinned `version`.

pub mod types;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::consts::{APP_NAME, GENERATED_MARKER, MANAGED_BY_LABEL};
use crate::policy::{AddonBinding, PromotionPolicy};
use crate::util::hash::{ContentHash, hash_str};

use types::{
  ApplicationSet, ApplicationSetSpec, ApplicationSetSyncPolicy, ApplicationSource, ApplicationSpec, ApplicationTemplate,
  AutomatedSync, ClusterGenerator, Destination, Generator, HelmOptions, LabelSelector, ObjectMeta, SyncPolicy,
};

/// Label carrying the addon name on generated objects.
pub const ADDON_LABEL: &str = "addons.argoproj.io/name";

const API_VERSION: &str = "argoproj.io/v1alpha1";
const KIND: &str = "ApplicationSet";

const REPO_URL_ANNOTATION: &str = "{{.metadata.annotations.addons_repo_url}}";
const REPO_REVISION_ANNOTATION: &str = "{{.metadata.annotations.addons_repo_revision}}";
const REPO_BASEPATH_ANNOTATION: &str = "{{.metadata.annotations.addons_repo_basepath}}";

/// A binding that cannot be turned into a definition.
///
/// Render errors affect only their own entry: the binding is skipped and the
/// run continues.
#[derive(Debug, Error)]
pub enum RenderError {
  /// Neither the binding nor the defaults name a target namespace.
  #[error("addon '{addon}': no namespace given and no default namespace to inherit")]
  NamespaceUnresolved { addon: String },

  /// An external Helm source is missing one of its fields.
  #[error("addon '{addon}': external chart source requires `{field}`")]
  IncompleteChartSource { addon: String, field: String },

  /// Serialization failed.
  #[error("addon '{addon}': failed to serialize definition: {source}")]
  Serialize {
    addon: String,
    #[source]
    source: serde_yaml::Error,
  },
}

impl RenderError {
  pub fn addon(&self) -> &str {
    match self {
      RenderError::NamespaceUnresolved { addon }
      | RenderError::IncompleteChartSource { addon, .. }
      | RenderError::Serialize { addon, .. } => addon,
    }
  }
}

/// Canonical content for one binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
  pub name: String,
  pub content: String,
  pub hash: ContentHash,
}

/// Render `binding` into its canonical definition body.
pub fn render_binding(policy: &PromotionPolicy, binding: &AddonBinding) -> Result<Rendered, RenderError> {
  let namespace = policy
    .resolved_namespace(binding)
    .ok_or_else(|| RenderError::NamespaceUnresolved {
      addon: binding.name.clone(),
    })?
    .to_string();

  let source = render_source(policy, binding)?;
  let appset = build_application_set(policy, binding, namespace, source);

  let body = serde_yaml::to_string(&appset).map_err(|source| RenderError::Serialize {
    addon: binding.name.clone(),
    source,
  })?;
  let content = format!("{}\n{}", GENERATED_MARKER, body);
  let hash = hash_str(&content);

  Ok(Rendered {
    name: binding.name.clone(),
    content,
    hash,
  })
}

/// Cluster label that opts a cluster into an addon, e.g. `enable_argo_cd`.
pub fn enable_label(name: &str) -> String {
  format!("enable_{}", name.replace('-', "_"))
}

fn render_source(policy: &PromotionPolicy, binding: &AddonBinding) -> Result<ApplicationSource, RenderError> {
  let helm = HelmOptions {
    release_name: binding.name.clone(),
  };

  if !binding.uses_external_chart() {
    return Ok(ApplicationSource {
      repo_url: REPO_URL_ANNOTATION.to_string(),
      chart: None,
      path: Some(format!(
        "{}{}/{}",
        REPO_BASEPATH_ANNOTATION,
        policy.defaults.chart_path(),
        binding.name
      )),
      target_revision: REPO_REVISION_ANNOTATION.to_string(),
      helm,
    });
  }

  let incomplete = |field: &str| RenderError::IncompleteChartSource {
    addon: binding.name.clone(),
    field: field.to_string(),
  };
  let repo_url = binding.repo_url.clone().ok_or_else(|| incomplete("repoURL"))?;
  let version = binding.version.clone().ok_or_else(|| incomplete("version"))?;

  Ok(ApplicationSource {
    repo_url,
    chart: Some(binding.chart.clone().unwrap_or_else(|| binding.name.clone())),
    path: None,
    target_revision: version,
    helm,
  })
}

fn build_application_set(
  policy: &PromotionPolicy,
  binding: &AddonBinding,
  namespace: String,
  source: ApplicationSource,
) -> ApplicationSet {
  let mut labels = BTreeMap::new();
  labels.insert(MANAGED_BY_LABEL.to_string(), APP_NAME.to_string());
  labels.insert(ADDON_LABEL.to_string(), binding.name.clone());

  let mut match_labels = policy.resolved_selector(binding);
  match_labels.insert(enable_label(&binding.name), "true".to_string());

  let mut template_labels = BTreeMap::new();
  template_labels.insert(ADDON_LABEL.to_string(), binding.name.clone());

  ApplicationSet {
    api_version: API_VERSION.to_string(),
    kind: KIND.to_string(),
    metadata: ObjectMeta {
      name: binding.name.clone(),
      namespace: Some(policy.defaults.appset_namespace().to_string()),
      labels,
    },
    spec: ApplicationSetSpec {
      go_template: true,
      go_template_options: vec!["missingkey=error".to_string()],
      sync_policy: ApplicationSetSyncPolicy {
        preserve_resources_on_deletion: true,
      },
      generators: vec![Generator {
        clusters: ClusterGenerator {
          selector: LabelSelector { match_labels },
        },
      }],
      template: ApplicationTemplate {
        metadata: ObjectMeta {
          name: format!("{}-{{{{.name}}}}", binding.name),
          namespace: None,
          labels: template_labels,
        },
        spec: ApplicationSpec {
          project: policy.defaults.project().to_string(),
          source,
          destination: Destination {
            server: "{{.server}}".to_string(),
            namespace,
          },
          sync_policy: SyncPolicy {
            automated: AutomatedSync {
              prune: true,
              self_heal: true,
            },
            sync_options: vec!["CreateNamespace=true".to_string(), "ServerSideApply=true".to_string()],
          },
        },
      },
    },
  }
}
