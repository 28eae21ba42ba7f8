//! Implementation of the `appsetgen update` command.
//!
//! This command loads the promotion policy, computes the changes needed to
//! bring the generated ApplicationSets in line with it and applies them, or
//! only reports them with `--dry-run`.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use owo_colors::{OwoColorize, Stream};

use appsetgen_lib::plan::{ApplyResult, ChangeKind, EntryStatus};
use appsetgen_lib::settings::Settings;
use appsetgen_lib::summary::write_summary;
use appsetgen_lib::update::{UpdateOptions, run_update};

use crate::output::{
  OutputFormat, change_symbol, change_verb, format_duration, print_error, print_json, relative, result_json, symbols,
};

/// Execute the update command.
///
/// # Arguments
///
/// * `settings` - Resolved policy, output and catalog locations.
/// * `dry_run` - If true, report the plan without touching any file.
/// * `summary` - Optional path for a markdown summary of the run.
/// * `format` - Text or JSON output on stdout.
///
/// # Errors
///
/// Returns an error if the policy is invalid (nothing is written), or if any
/// entry failed to render or to be written/deleted. Successful entries are
/// kept either way.
pub fn cmd_update(
  settings: &Settings,
  dry_run: bool,
  summary: Option<&Path>,
  format: OutputFormat,
  verbose: bool,
) -> Result<()> {
  let start = Instant::now();

  let result = run_update(settings, &UpdateOptions { dry_run })
    .with_context(|| format!("Failed to update from {}", settings.policy.display()))?;

  if let Some(path) = summary {
    write_summary(&result, path).context("Failed to write summary")?;
  }

  if format.is_json() {
    print_json(&result_json(&result, &settings.root))?;
  } else {
    print_result(&result, &settings.root, verbose);
    println!(
      "  {} Duration: {}",
      symbols::INFO.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      format_duration(start.elapsed()).if_supports_color(Stream::Stdout, |s| s.dimmed())
    );
  }

  if !result.is_success() {
    bail!("{} entr{} failed", result.failure_count(), if result.failure_count() == 1 { "y" } else { "ies" });
  }
  Ok(())
}

/// Human-readable report shared by `update` and `check`.
pub fn print_result(result: &ApplyResult, root: &Path, verbose: bool) {
  if result.dry_run {
    println!(
      "{}",
      "Dry run - no changes written".if_supports_color(Stream::Stdout, |s| s.yellow())
    );
    println!();
  }

  for outcome in &result.outcomes {
    let change = &outcome.change;
    let symbol = change_symbol(change.kind);
    let symbol = match change.kind {
      ChangeKind::Create => symbol.if_supports_color(Stream::Stdout, |s| s.green()).to_string(),
      ChangeKind::Update => symbol.if_supports_color(Stream::Stdout, |s| s.yellow()).to_string(),
      ChangeKind::Delete => symbol.if_supports_color(Stream::Stdout, |s| s.red()).to_string(),
    };
    let path = relative(&change.path, root).to_string();

    match &outcome.status {
      EntryStatus::Failed(failure) => {
        print_error(&format!("{}: {}", change.name, failure));
      }
      EntryStatus::Applied | EntryStatus::WouldApply => {
        println!(
          "  {} {} {} {}",
          symbol,
          change_verb(change.kind, result.dry_run),
          change.name.if_supports_color(Stream::Stdout, |s| s.cyan()),
          format!("({})", path).if_supports_color(Stream::Stdout, |s| s.dimmed())
        );
      }
    }

    if verbose {
      let old = change.old_hash.as_ref().map(|h| h.short()).unwrap_or("-");
      let new = change.new_hash.as_ref().map(|h| h.short()).unwrap_or("-");
      println!(
        "      {}",
        format!("{} -> {}", old, new).if_supports_color(Stream::Stdout, |s| s.dimmed())
      );
    }
  }

  for failure in &result.render_failures {
    print_error(&failure.to_string());
  }

  if verbose && !result.unchanged.is_empty() {
    println!(
      "  {} Unchanged: {}",
      symbols::INFO.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      result.unchanged.join(", ").if_supports_color(Stream::Stdout, |s| s.dimmed())
    );
  }

  let created = result.succeeded(ChangeKind::Create);
  let updated = result.succeeded(ChangeKind::Update);
  let deleted = result.succeeded(ChangeKind::Delete);
  let failed = result.failure_count();

  if result.outcomes.is_empty() && failed == 0 {
    println!(
      "{} All generated definitions are up to date.",
      symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green())
    );
    return;
  }

  println!();
  let prefix = if result.dry_run { "Would apply" } else { "Applied" };
  println!(
    "{}: {} created, {} updated, {} deleted, {} unchanged, {} failed",
    prefix,
    created,
    updated,
    deleted,
    result.unchanged.len(),
    failed
  );
}
