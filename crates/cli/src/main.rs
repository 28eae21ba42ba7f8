mod cmd;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use appsetgen_lib::settings::{Settings, SettingsOverrides};

use cmd::{cmd_check, cmd_update, cmd_validate};
use output::{OutputFormat, print_error};

/// appsetgen - Generate Argo CD ApplicationSets from a promotion policy
#[derive(Parser)]
#[command(name = "appsetgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Repository root that relative paths are resolved against
  #[arg(long, global = true, default_value = ".")]
  root: PathBuf,

  /// Path to the promotion policy (env: APPSETGEN_POLICY)
  #[arg(long, global = true)]
  policy: Option<PathBuf>,

  /// Directory holding the generated ApplicationSets (env: APPSETGEN_OUTPUT_DIR)
  #[arg(long, global = true)]
  output_dir: Option<PathBuf>,

  /// Chart catalog directory (env: APPSETGEN_CATALOG_DIR)
  #[arg(long, global = true)]
  catalog: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Regenerate ApplicationSets from the promotion policy
  Update {
    /// Show what would change without writing anything
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Write a markdown summary of the run to this file
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
  },

  /// Fail if the generated ApplicationSets are out of date
  Check {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
  },

  /// Validate the promotion policy without writing anything
  Validate,
}

fn main() {
  let cli = Cli::parse();

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
    if cli.verbose {
      EnvFilter::new("debug")
    } else {
      EnvFilter::new("warn")
    }
  });

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let overrides = SettingsOverrides {
    policy: cli.policy,
    output_dir: cli.output_dir,
    catalog_dir: cli.catalog,
  };
  let settings = Settings::resolve(&cli.root, &overrides);
  debug!(version = env!("CARGO_PKG_VERSION"), "appsetgen starting");

  let result = match cli.command {
    Commands::Update {
      dry_run,
      summary,
      format,
    } => cmd_update(&settings, dry_run, summary.as_deref(), format, cli.verbose),
    Commands::Check { format } => cmd_check(&settings, format, cli.verbose),
    Commands::Validate => cmd_validate(&settings, cli.verbose),
  };

  if let Err(err) = result {
    print_error(&format!("{:#}", err));
    std::process::exit(1);
  }
}
