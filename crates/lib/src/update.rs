//! Update orchestration.
//!
//! This module ties the pieces together for the `update`, `check` and
//! `validate` commands:
//!
//! 1. Load and validate the promotion policy
//! 2. Check catalog-sourced bindings against the chart catalog, if present
//! 3. Scan the output directory for generated definitions
//! 4. Compute the plan
//! 5. Apply it (or report what would be applied)
//!
//! Steps 1 to 3 are fatal on error and run before anything is written.

use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::{Catalog, CatalogError, validate_catalog};
use crate::definitions::{DefinitionSet, ScanError, scan};
use crate::plan::{ApplyResult, DiffPlan, apply, plan};
use crate::policy::{PolicyError, PromotionPolicy, ValidationError, load};
use crate::settings::Settings;

/// Options for the update operation.
#[derive(Debug, Default, Clone, Copy)]
pub struct UpdateOptions {
  /// If true, compute and report the plan without modifying any file.
  pub dry_run: bool,
}

/// Errors that abort a run before anything is written.
#[derive(Debug, Error)]
pub enum UpdateError {
  #[error(transparent)]
  Policy(#[from] PolicyError),

  #[error(transparent)]
  Catalog(#[from] CatalogError),

  #[error("invalid policy: {0}")]
  Invalid(#[from] ValidationError),

  #[error("failed to scan generated definitions: {0}")]
  Scan(#[from] ScanError),
}

impl UpdateError {
  /// The validation failure, if the run was aborted by one.
  pub fn validation(&self) -> Option<&ValidationError> {
    match self {
      UpdateError::Policy(err) => err.validation(),
      UpdateError::Invalid(err) => Some(err),
      _ => None,
    }
  }
}

/// A policy that passed every check, with the catalog it was checked against.
#[derive(Debug)]
pub struct ValidatedPolicy {
  pub policy: PromotionPolicy,
  pub catalog: Option<Catalog>,
}

/// Load the policy and check it against the catalog, if one exists.
pub fn load_validated(settings: &Settings) -> Result<ValidatedPolicy, UpdateError> {
  let policy = load(&settings.policy)?;

  let catalog = Catalog::load(&settings.catalog_dir)?;
  match &catalog {
    Some(catalog) => {
      validate_catalog(&policy, catalog)?;
      debug!(entries = catalog.len(), "policy matches catalog");
    }
    None => debug!(path = %settings.catalog_dir.display(), "no catalog, skipping catalog check"),
  }

  Ok(ValidatedPolicy { policy, catalog })
}

/// Compute the plan for the repository described by `settings`.
pub fn compute_plan(settings: &Settings) -> Result<DiffPlan, UpdateError> {
  let validated = load_validated(settings)?;
  let existing: DefinitionSet = scan(&settings.output_dir)?;
  info!(
    existing = existing.len(),
    output_dir = %settings.output_dir.display(),
    "scanned generated definitions"
  );
  Ok(plan(&validated.policy, &existing))
}

/// Plan and apply.
pub fn run_update(settings: &Settings, options: &UpdateOptions) -> Result<ApplyResult, UpdateError> {
  let plan = compute_plan(settings)?;
  Ok(apply(plan, options.dry_run))
}
