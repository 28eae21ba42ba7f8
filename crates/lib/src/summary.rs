//! Markdown summary of an apply run, for CI job summaries.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::plan::{ApplyResult, EntryStatus};

#[derive(Debug, Error)]
pub enum SummaryError {
  #[error("failed to write summary {}: {source}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Render `result` as a GitHub-flavoured markdown table.
pub fn render_summary(result: &ApplyResult) -> String {
  let mut out = String::new();
  if result.dry_run {
    out.push_str("Dry run: no files were modified.\n\n");
  }

  if result.outcomes.is_empty() && result.render_failures.is_empty() {
    out.push_str("All generated definitions are up to date.\n");
    return out;
  }

  out.push_str("| Addon | File | Action | Status |\n");
  out.push_str("|-------|------|--------|--------|\n");

  for outcome in &result.outcomes {
    let file = outcome
      .change
      .path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();
    let status = match &outcome.status {
      EntryStatus::Applied => "applied".to_string(),
      EntryStatus::WouldApply => "would apply".to_string(),
      EntryStatus::Failed(failure) => format!("failed: {}", escape(&failure.source.to_string())),
    };
    out.push_str(&format!(
      "| {} | {} | {} | {} |\n",
      outcome.change.name, file, outcome.change.kind, status
    ));
  }

  for failure in &result.render_failures {
    out.push_str(&format!(
      "| {} | | render | failed: {} |\n",
      failure.addon(),
      escape(&failure.to_string())
    ));
  }

  out
}

/// Write the summary for `result` to `path`.
pub fn write_summary(result: &ApplyResult, path: &Path) -> Result<(), SummaryError> {
  fs::write(path, render_summary(result)).map_err(|source| SummaryError::Write {
    path: path.to_path_buf(),
    source,
  })
}

fn escape(text: &str) -> String {
  text.replace('|', "\\|").replace('\n', " ")
}
