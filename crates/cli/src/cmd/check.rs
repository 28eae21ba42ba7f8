//! Implementation of the `appsetgen check` command.
//!
//! Computes the plan in dry-run mode and fails when the generated
//! definitions do not match the policy. Intended for pre-commit hooks and CI
//! gates; it never writes anything.

use anyhow::{Context, Result, bail};
use owo_colors::{OwoColorize, Stream};

use appsetgen_lib::settings::Settings;
use appsetgen_lib::update::{UpdateOptions, run_update};

use crate::cmd::update::print_result;
use crate::output::{OutputFormat, print_json, result_json};

pub fn cmd_check(settings: &Settings, format: OutputFormat, verbose: bool) -> Result<()> {
  let result = run_update(settings, &UpdateOptions { dry_run: true })
    .with_context(|| format!("Failed to check against {}", settings.policy.display()))?;

  if format.is_json() {
    print_json(&result_json(&result, &settings.root))?;
  } else {
    print_result(&result, &settings.root, verbose);
  }

  if !result.render_failures.is_empty() {
    bail!("{} addon(s) could not be rendered", result.render_failures.len());
  }
  if !result.outcomes.is_empty() {
    if !format.is_json() {
      println!(
        "{}",
        "Run `appsetgen update` to regenerate.".if_supports_color(Stream::Stdout, |s| s.dimmed())
      );
    }
    bail!(
      "generated definitions are out of date ({} change(s) pending)",
      result.outcomes.len()
    );
  }
  Ok(())
}
