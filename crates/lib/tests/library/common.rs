//! Shared helpers for library integration tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use appsetgen_lib::definitions::{DefinitionSet, scan};
use appsetgen_lib::policy::PromotionPolicy;
use appsetgen_lib::settings::Settings;

/// An isolated repository with a policy file and an output directory.
pub struct TestRepo {
  pub temp: TempDir,
  pub settings: Settings,
}

impl TestRepo {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_path_buf();
    let settings = Settings {
      policy: root.join("addons").join("promotion-policy.yaml"),
      output_dir: root.join("applicationsets"),
      catalog_dir: root.join("charts"),
      root,
    };
    Self { temp, settings }
  }

  /// Write the promotion policy.
  pub fn write_policy(&self, content: &str) {
    if let Some(parent) = self.settings.policy.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(&self.settings.policy, content).unwrap();
  }

  pub fn policy(&self) -> PromotionPolicy {
    appsetgen_lib::policy::load(&self.settings.policy).unwrap()
  }

  pub fn existing(&self) -> DefinitionSet {
    scan(&self.settings.output_dir).unwrap()
  }

  pub fn output_file(&self, name: &str) -> PathBuf {
    self.settings.output_dir.join(format!("{}.yaml", name))
  }

  /// Every file under the repository root with its content.
  pub fn snapshot(&self) -> BTreeMap<PathBuf, String> {
    let mut files = BTreeMap::new();
    collect(self.temp.path(), &mut files);
    files
  }
}

fn collect(dir: &Path, files: &mut BTreeMap<PathBuf, String>) {
  for entry in fs::read_dir(dir).unwrap() {
    let path = entry.unwrap().path();
    if path.is_dir() {
      collect(&path, files);
    } else {
      let content = fs::read_to_string(&path).unwrap();
      files.insert(path, content);
    }
  }
}
