//! Argo CD ApplicationSet document model.
//!
//! Only the subset of the schema the generator emits. Field order in these
//! structs is the key order in the rendered YAML, and every map is a
//! `BTreeMap`, so serialization is stable.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSet {
  pub api_version: String,
  pub kind: String,
  pub metadata: ObjectMeta,
  pub spec: ApplicationSetSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectMeta {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub namespace: Option<String>,
  #[serde(skip_serializing_if = "BTreeMap::is_empty")]
  pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSetSpec {
  pub go_template: bool,
  pub go_template_options: Vec<String>,
  pub sync_policy: ApplicationSetSyncPolicy,
  pub generators: Vec<Generator>,
  pub template: ApplicationTemplate,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSetSyncPolicy {
  pub preserve_resources_on_deletion: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Generator {
  pub clusters: ClusterGenerator,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClusterGenerator {
  pub selector: LabelSelector,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
  pub match_labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationTemplate {
  pub metadata: ObjectMeta,
  pub spec: ApplicationSpec,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSpec {
  pub project: String,
  pub source: ApplicationSource,
  pub destination: Destination,
  pub sync_policy: SyncPolicy,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSource {
  #[serde(rename = "repoURL")]
  pub repo_url: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub chart: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub path: Option<String>,
  pub target_revision: String,
  pub helm: HelmOptions,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HelmOptions {
  pub release_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Destination {
  pub server: String,
  pub namespace: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPolicy {
  pub automated: AutomatedSync,
  pub sync_options: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomatedSync {
  pub prune: bool,
  pub self_heal: bool,
}
