//! Validate command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn validate_reports_binding_counts() {
  let env = TestEnv::from_fixture("three_addons.yaml");

  env
    .appsetgen_cmd()
    .arg("validate")
    .assert()
    .success()
    .stdout(predicate::str::contains("Policy is valid"))
    .stdout(predicate::str::contains("Bindings: 3"));

  assert!(env.output_files().is_empty());
}

#[test]
fn validate_rejects_duplicate_names() {
  let env = TestEnv::from_fixture("duplicate_name.yaml");

  env
    .appsetgen_cmd()
    .arg("validate")
    .assert()
    .failure()
    .stderr(predicate::str::contains("addon 'argo-cd'"));
}

#[test]
fn validate_rejects_unknown_fields() {
  let env = TestEnv::empty();
  env.write_policy("addons:\n  - name: argo-cd\n    namespace: argocd\n    replicas: 2\n");

  env
    .appsetgen_cmd()
    .arg("validate")
    .assert()
    .failure()
    .stderr(predicate::str::contains("replicas"));
}

#[test]
fn validate_reports_render_failures() {
  let env = TestEnv::from_fixture("missing_namespace.yaml");

  env
    .appsetgen_cmd()
    .arg("validate")
    .assert()
    .failure()
    .stderr(predicate::str::contains("cert-manager"));
}

#[test]
fn validate_checks_the_catalog() {
  let env = TestEnv::from_fixture("three_addons.yaml");
  env.write_file("charts/argo-cd/Chart.yaml", "name: argo-cd\n");
  env.write_file("charts/metrics-server/Chart.yaml", "name: metrics-server\n");

  env
    .appsetgen_cmd()
    .arg("validate")
    .assert()
    .failure()
    .stderr(predicate::str::contains("cert-manager"))
    .stderr(predicate::str::contains("catalog"));
}

#[test]
fn validate_passes_with_complete_catalog() {
  let env = TestEnv::from_fixture("three_addons.yaml");
  for name in ["argo-cd", "cert-manager", "metrics-server"] {
    env.write_file(&format!("charts/{}/Chart.yaml", name), "apiVersion: v2\n");
  }

  env
    .appsetgen_cmd()
    .arg("validate")
    .assert()
    .success()
    .stdout(predicate::str::contains("Catalog entries: 3"));
}
