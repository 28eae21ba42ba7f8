//! Applying a [`DiffPlan`] to the output directory.
//!
//! Every change is attempted independently. A failed write or delete is
//! recorded against its entry and the remaining changes still run; nothing
//! already applied is rolled back. Re-running converges because rendering is
//! idempotent.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::render::RenderError;

use super::diff::{ChangeKind, DiffPlan, PlannedChange};

/// Filesystem operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOperation {
  Write,
  Delete,
}

impl std::fmt::Display for IoOperation {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      IoOperation::Write => f.write_str("write"),
      IoOperation::Delete => f.write_str("delete"),
    }
  }
}

/// A per-entry filesystem failure during apply.
#[derive(Debug, Error)]
#[error("failed to {operation} {}: {source}", path.display())]
pub struct IoFailure {
  pub operation: IoOperation,
  pub path: PathBuf,
  #[source]
  pub source: io::Error,
}

/// Outcome of one planned change.
#[derive(Debug)]
pub enum EntryStatus {
  /// The change was written to disk.
  Applied,
  /// Dry run: the change would have been applied.
  WouldApply,
  Failed(IoFailure),
}

#[derive(Debug)]
pub struct EntryOutcome {
  pub change: PlannedChange,
  pub status: EntryStatus,
}

impl EntryOutcome {
  pub fn is_failed(&self) -> bool {
    matches!(self.status, EntryStatus::Failed(_))
  }
}

/// Result of an apply operation.
#[derive(Debug)]
pub struct ApplyResult {
  pub dry_run: bool,

  /// One outcome per planned change, in plan order.
  pub outcomes: Vec<EntryOutcome>,

  /// Bindings that were skipped because they could not be rendered.
  pub render_failures: Vec<RenderError>,

  /// Addons whose definition was already up to date.
  pub unchanged: Vec<String>,
}

impl ApplyResult {
  /// Number of successful (or, in dry run, would-be) changes of `kind`.
  pub fn succeeded(&self, kind: ChangeKind) -> usize {
    self
      .outcomes
      .iter()
      .filter(|o| o.change.kind == kind && !o.is_failed())
      .count()
  }

  /// Entries whose write or delete failed.
  pub fn io_failures(&self) -> impl Iterator<Item = (&PlannedChange, &IoFailure)> {
    self.outcomes.iter().filter_map(|o| match &o.status {
      EntryStatus::Failed(failure) => Some((&o.change, failure)),
      _ => None,
    })
  }

  /// Number of failed entries, counting render failures.
  pub fn failure_count(&self) -> usize {
    self.io_failures().count() + self.render_failures.len()
  }

  /// Returns true if every entry succeeded.
  pub fn is_success(&self) -> bool {
    self.failure_count() == 0
  }
}

/// Apply `plan`.
///
/// With `dry_run` set nothing on disk is touched and every change is reported
/// as [`EntryStatus::WouldApply`]. Otherwise creates and updates write the
/// rendered content to the change's path and deletes remove the file.
pub fn apply(plan: DiffPlan, dry_run: bool) -> ApplyResult {
  info!(
    dry_run,
    changes = plan.changes.len(),
    render_failures = plan.render_failures.len(),
    "applying plan"
  );

  let mut outcomes = Vec::with_capacity(plan.changes.len());
  for change in plan.changes {
    let status = if dry_run {
      EntryStatus::WouldApply
    } else {
      match execute_change(&change) {
        Ok(()) => {
          debug!(addon = %change.name, kind = %change.kind, path = %change.path.display(), "applied");
          EntryStatus::Applied
        }
        Err(failure) => {
          warn!(addon = %change.name, error = %failure, "change failed");
          EntryStatus::Failed(failure)
        }
      }
    };
    outcomes.push(EntryOutcome { change, status });
  }

  let result = ApplyResult {
    dry_run,
    outcomes,
    render_failures: plan.render_failures,
    unchanged: plan.unchanged,
  };
  info!(dry_run, failures = result.failure_count(), "apply finished");
  result
}

fn execute_change(change: &PlannedChange) -> Result<(), IoFailure> {
  match change.kind {
    ChangeKind::Create | ChangeKind::Update => {
      let content = change.new_content.as_deref().unwrap_or_default();
      write_definition(&change.path, content).map_err(|source| IoFailure {
        operation: IoOperation::Write,
        path: change.path.clone(),
        source,
      })
    }
    ChangeKind::Delete => remove_definition(&change.path).map_err(|source| IoFailure {
      operation: IoOperation::Delete,
      path: change.path.clone(),
      source,
    }),
  }
}

/// Write through a temporary file in the target directory so readers never
/// observe a half-written definition.
fn write_definition(path: &Path, content: &str) -> io::Result<()> {
  let dir = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };
  fs::create_dir_all(dir)?;

  let mut temp = NamedTempFile::new_in(dir)?;
  temp.write_all(content.as_bytes())?;
  temp.flush()?;

  // Temporary files are created 0600; definitions are ordinary repository files.
  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    temp.as_file().set_permissions(fs::Permissions::from_mode(0o644))?;
  }

  temp.persist(path).map_err(|e| e.error)?;
  Ok(())
}

fn remove_definition(path: &Path) -> io::Result<()> {
  match fs::remove_file(path) {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      debug!(path = %path.display(), "definition already gone");
      Ok(())
    }
    Err(e) => Err(e),
  }
}
