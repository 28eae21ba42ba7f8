//! Diff computation between the promotion policy and the generated definitions.
//!
//! This module computes the difference between the desired definitions
//! (rendered from the policy) and the ones currently on disk, determining
//! which files need to be created, rewritten or removed.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::definitions::DefinitionSet;
use crate::policy::PromotionPolicy;
use crate::render::{RenderError, render_binding};
use crate::util::hash::ContentHash;

/// What a planned change does to its definition file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
  Create,
  Update,
  Delete,
}

impl ChangeKind {
  pub fn as_str(self) -> &'static str {
    match self {
      ChangeKind::Create => "create",
      ChangeKind::Update => "update",
      ChangeKind::Delete => "delete",
    }
  }
}

impl std::fmt::Display for ChangeKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One entry of a [`DiffPlan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedChange {
  /// Addon name.
  pub name: String,
  pub kind: ChangeKind,
  /// Canonical path of the definition file.
  pub path: PathBuf,
  /// Current content (update and delete).
  pub old_content: Option<String>,
  pub old_hash: Option<ContentHash>,
  /// Rendered content (create and update).
  pub new_content: Option<String>,
  pub new_hash: Option<ContentHash>,
}

/// Transition from the current definitions to the desired ones.
///
/// Changes follow the policy's declared order. Deletions of definitions
/// whose binding was removed from the policy come last, sorted by name.
#[derive(Debug, Default)]
pub struct DiffPlan {
  pub changes: Vec<PlannedChange>,

  /// Bindings skipped because they could not be rendered.
  pub render_failures: Vec<RenderError>,

  /// Addons whose definition is already up to date.
  pub unchanged: Vec<String>,
}

impl DiffPlan {
  /// Returns true if there are no changes to make.
  pub fn is_empty(&self) -> bool {
    self.changes.is_empty()
  }

  /// Number of changes of the given kind.
  pub fn count(&self, kind: ChangeKind) -> usize {
    self.changes.iter().filter(|c| c.kind == kind).count()
  }

  pub fn has_render_failures(&self) -> bool {
    !self.render_failures.is_empty()
  }
}

/// Compute the plan that brings `existing` in line with `policy`.
///
/// # Diff Logic
///
/// - Enabled binding without a definition → create
/// - Enabled binding whose rendered content differs → update
/// - Definition whose binding is disabled or gone → delete
/// - Enabled binding with identical content → unchanged (not a change)
///
/// A binding that fails to render is recorded in
/// [`DiffPlan::render_failures`]; its existing definition is left alone.
pub fn plan(policy: &PromotionPolicy, existing: &DefinitionSet) -> DiffPlan {
  let mut plan = DiffPlan::default();

  for binding in &policy.bindings {
    let current = existing.get(&binding.name);

    if !binding.enabled {
      if let Some(current) = current {
        debug!(addon = %binding.name, "binding disabled, definition will be deleted");
        plan.changes.push(PlannedChange {
          name: binding.name.clone(),
          kind: ChangeKind::Delete,
          path: current.path.clone(),
          old_content: Some(current.content.clone()),
          old_hash: Some(current.hash.clone()),
          new_content: None,
          new_hash: None,
        });
      }
      continue;
    }

    let rendered = match render_binding(policy, binding) {
      Ok(rendered) => rendered,
      Err(err) => {
        warn!(addon = %binding.name, error = %err, "skipping binding that failed to render");
        plan.render_failures.push(err);
        continue;
      }
    };

    match current {
      None => {
        let path = existing.path_for(&binding.name);
        if existing.unmanaged().contains(&path) {
          warn!(path = %path.display(), "hand-written file will be replaced by a generated definition");
        }
        plan.changes.push(PlannedChange {
          name: rendered.name,
          kind: ChangeKind::Create,
          path,
          old_content: None,
          old_hash: None,
          new_content: Some(rendered.content),
          new_hash: Some(rendered.hash),
        });
      }
      Some(current) if current.content == rendered.content => {
        plan.unchanged.push(rendered.name);
      }
      Some(current) => {
        plan.changes.push(PlannedChange {
          name: rendered.name,
          kind: ChangeKind::Update,
          path: current.path.clone(),
          old_content: Some(current.content.clone()),
          old_hash: Some(current.hash.clone()),
          new_content: Some(rendered.content),
          new_hash: Some(rendered.hash),
        });
      }
    }
  }

  // DefinitionSet iterates in name order, so orphan deletions are deterministic.
  for current in existing.iter() {
    if policy.get(&current.name).is_none() {
      debug!(addon = %current.name, "binding removed, definition will be deleted");
      plan.changes.push(PlannedChange {
        name: current.name.clone(),
        kind: ChangeKind::Delete,
        path: current.path.clone(),
        old_content: Some(current.content.clone()),
        old_hash: Some(current.hash.clone()),
        new_content: None,
        new_hash: None,
      });
    }
  }

  plan
}
