//! CLI output formatting utilities.
//!
//! Provides consistent formatting for terminal output including colored status
//! messages, the JSON shape of a run, and Unicode symbols.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};
use serde_json::json;

use appsetgen_lib::plan::{ApplyResult, ChangeKind, EntryStatus};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ADD: &str = "+";
  pub const MODIFY: &str = "~";
  pub const REMOVE: &str = "-";
}

pub fn change_symbol(kind: ChangeKind) -> &'static str {
  match kind {
    ChangeKind::Create => symbols::ADD,
    ChangeKind::Update => symbols::MODIFY,
    ChangeKind::Delete => symbols::REMOVE,
  }
}

/// Past-tense or conditional verb for a change.
pub fn change_verb(kind: ChangeKind, dry_run: bool) -> &'static str {
  match (kind, dry_run) {
    (ChangeKind::Create, false) => "created",
    (ChangeKind::Update, false) => "updated",
    (ChangeKind::Delete, false) => "deleted",
    (ChangeKind::Create, true) => "would create",
    (ChangeKind::Update, true) => "would update",
    (ChangeKind::Delete, true) => "would delete",
  }
}

/// Display `path` relative to `root` when it lives inside it.
pub fn relative<'a>(path: &'a Path, root: &Path) -> std::path::Display<'a> {
  path.strip_prefix(root).unwrap_or(path).display()
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    let mins = secs / 60;
    let remaining_secs = secs % 60;
    format!("{}m {}s", mins, remaining_secs)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

/// Machine-readable form of a run.
pub fn result_json(result: &ApplyResult, root: &Path) -> serde_json::Value {
  let changes: Vec<_> = result
    .outcomes
    .iter()
    .map(|outcome| {
      let (status, error) = match &outcome.status {
        EntryStatus::Applied => ("applied", None),
        EntryStatus::WouldApply => ("would_apply", None),
        EntryStatus::Failed(failure) => ("failed", Some(failure.to_string())),
      };
      json!({
        "name": outcome.change.name,
        "action": outcome.change.kind.as_str(),
        "path": relative(&outcome.change.path, root).to_string(),
        "status": status,
        "error": error,
        "old_hash": outcome.change.old_hash,
        "new_hash": outcome.change.new_hash,
      })
    })
    .collect();
  let render_failures: Vec<_> = result
    .render_failures
    .iter()
    .map(|f| json!({ "name": f.addon(), "error": f.to_string() }))
    .collect();

  json!({
    "dry_run": result.dry_run,
    "changes": changes,
    "render_failures": render_failures,
    "unchanged": result.unchanged,
    "success": result.is_success(),
  })
}
