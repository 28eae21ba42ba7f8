//! Implementation of the `appsetgen validate` command.
//!
//! Loads the promotion policy, checks it against the chart catalog when one
//! exists, and renders every enabled binding without writing anything.

use anyhow::{Context, Result, bail};

use appsetgen_lib::render::render_binding;
use appsetgen_lib::settings::Settings;
use appsetgen_lib::update::load_validated;

use crate::output::{print_error, print_info, print_stat, print_success, print_warning, relative, symbols};

pub fn cmd_validate(settings: &Settings, verbose: bool) -> Result<()> {
  let validated = load_validated(settings)
    .with_context(|| format!("Policy {} is invalid", relative(&settings.policy, &settings.root)))?;
  let policy = &validated.policy;

  print_success(&format!("Policy is valid: {}", relative(&settings.policy, &settings.root)));
  print_stat("Bindings", &policy.bindings.len().to_string());
  print_stat("Enabled", &policy.enabled().count().to_string());
  match &validated.catalog {
    Some(catalog) => print_stat("Catalog entries", &catalog.len().to_string()),
    None => print_info(&format!(
      "No catalog at {}, catalog check skipped",
      relative(&settings.catalog_dir, &settings.root)
    )),
  }

  if policy.enabled().next().is_none() {
    print_warning("No enabled bindings; every generated definition would be removed");
  }

  let mut errors = 0;
  for binding in policy.enabled() {
    match render_binding(policy, binding) {
      Ok(rendered) => {
        if verbose {
          println!(
            "  {} {} -> {} ({})",
            symbols::INFO,
            binding.name,
            policy.resolved_namespace(binding).unwrap_or("?"),
            rendered.hash.short()
          );
        }
      }
      Err(err) => {
        print_error(&err.to_string());
        errors += 1;
      }
    }
  }

  if errors > 0 {
    bail!("{} addon(s) could not be rendered", errors);
  }
  Ok(())
}
