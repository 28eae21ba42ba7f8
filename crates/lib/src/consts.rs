//! Crate-wide constants.

pub const APP_NAME: &str = "appsetgen";

/// Supported promotion-policy schema version.
pub const POLICY_VERSION: u32 = 1;

/// Repository-relative location of the promotion policy.
pub const DEFAULT_POLICY_PATH: &str = "addons/promotion-policy.yaml";

/// Repository-relative directory holding generated ApplicationSets.
pub const DEFAULT_OUTPUT_DIR: &str = "applicationsets";

/// Repository-relative Helm chart catalog.
pub const DEFAULT_CATALOG_DIR: &str = "charts";

pub const POLICY_ENV: &str = "APPSETGEN_POLICY";
pub const OUTPUT_DIR_ENV: &str = "APPSETGEN_OUTPUT_DIR";
pub const CATALOG_DIR_ENV: &str = "APPSETGEN_CATALOG_DIR";

/// Extension of generated definition files.
pub const DEFINITION_EXT: &str = "yaml";

/// First line of every generated definition. Files without it are not ours.
pub const GENERATED_MARKER: &str = "# Code generated by appsetgen from the promotion policy. DO NOT EDIT.";

/// Label stamped on every generated ApplicationSet.
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";

pub const SHORT_HASH_LEN: usize = 12;

pub const DEFAULT_PROJECT: &str = "default";
pub const DEFAULT_APPSET_NAMESPACE: &str = "argocd";
