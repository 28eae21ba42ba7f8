//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated repository checkout.
///
/// Each test gets its own temporary directory laid out with the default
/// policy, output and catalog locations.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Create from a fixture file.
  ///
  /// Copies the fixture content to `addons/promotion-policy.yaml`.
  pub fn from_fixture(name: &str) -> Self {
    let env = Self::empty();
    env.write_policy(&fixture_content(name));
    env
  }

  /// Create an empty test environment.
  pub fn empty() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// Repository root, canonicalized.
  pub fn root(&self) -> PathBuf {
    let p = self.temp.path().to_path_buf();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  pub fn policy_path(&self) -> PathBuf {
    self.root().join("addons").join("promotion-policy.yaml")
  }

  pub fn output_dir(&self) -> PathBuf {
    self.root().join("applicationsets")
  }

  /// Path of the generated definition for `name`.
  pub fn definition(&self, name: &str) -> PathBuf {
    self.output_dir().join(format!("{}.yaml", name))
  }

  pub fn write_policy(&self, content: &str) {
    self.write_file("addons/promotion-policy.yaml", content);
  }

  /// Write a file relative to the repository root.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.root().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Names of the files in the output directory, sorted.
  pub fn output_files(&self) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(self.output_dir()) else {
      return Vec::new();
    };
    let mut names: Vec<String> = entries
      .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
      .collect();
    names.sort();
    names
  }

  /// Get a pre-configured Command for the appsetgen binary.
  ///
  /// Points `--root` at the temp directory and clears the path environment
  /// variables so the defaults apply.
  pub fn appsetgen_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("appsetgen");
    cmd.env_remove("APPSETGEN_POLICY");
    cmd.env_remove("APPSETGEN_OUTPUT_DIR");
    cmd.env_remove("APPSETGEN_CATALOG_DIR");
    cmd.env_remove("RUST_LOG");
    cmd.arg("--root").arg(self.root());
    cmd
  }
}
