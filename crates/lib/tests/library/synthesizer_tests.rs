//! End-to-end plan/apply behaviour against a real output directory.

use std::fs;

use appsetgen_lib::consts::GENERATED_MARKER;
use appsetgen_lib::plan::{ChangeKind, EntryStatus, apply, plan};
use appsetgen_lib::render::render_binding;
use appsetgen_lib::update::{UpdateOptions, run_update};

use super::common::TestRepo;

const THREE_ADDONS: &str = r#"
version: 1
defaults:
  namespace: addons
  selector:
    environment: dev
addons:
  - name: argo-cd
    namespace: argocd
  - name: cert-manager
  - name: metrics-server
    namespace: kube-system
"#;

#[test]
fn argo_cd_create_then_empty_plan() {
  let repo = TestRepo::new();
  repo.write_policy("addons:\n  - name: argo-cd\n    namespace: argocd\n    enabled: true\n");

  let first = plan(&repo.policy(), &repo.existing());
  assert_eq!(first.changes.len(), 1);
  assert_eq!(first.changes[0].name, "argo-cd");
  assert_eq!(first.changes[0].kind, ChangeKind::Create);

  let result = apply(first, false);
  assert!(result.is_success());
  assert!(repo.output_file("argo-cd").exists());

  let second = plan(&repo.policy(), &repo.existing());
  assert!(second.is_empty());
  assert_eq!(second.unchanged, ["argo-cd"]);
}

#[test]
fn disabled_argo_cd_is_deleted() {
  let repo = TestRepo::new();
  repo.write_policy("addons:\n  - name: argo-cd\n    namespace: argocd\n");
  apply(plan(&repo.policy(), &repo.existing()), false);

  repo.write_policy("addons:\n  - name: argo-cd\n    enabled: false\n");
  let delete = plan(&repo.policy(), &repo.existing());

  assert_eq!(delete.changes.len(), 1);
  assert_eq!(delete.changes[0].kind, ChangeKind::Delete);
  assert_eq!(delete.changes[0].name, "argo-cd");

  apply(delete, false);
  assert!(!repo.output_file("argo-cd").exists());
}

#[test]
fn round_trip_creates_exactly_n_definitions() {
  let repo = TestRepo::new();
  repo.write_policy(THREE_ADDONS);

  let result = apply(plan(&repo.policy(), &repo.existing()), false);
  assert_eq!(result.succeeded(ChangeKind::Create), 3);

  let existing = repo.existing();
  assert_eq!(existing.len(), 3);
  assert!(plan(&repo.policy(), &existing).is_empty());
}

#[test]
fn removing_a_binding_deletes_only_its_definition() {
  let repo = TestRepo::new();
  repo.write_policy(THREE_ADDONS);
  apply(plan(&repo.policy(), &repo.existing()), false);
  let argo_before = fs::read_to_string(repo.output_file("argo-cd")).unwrap();

  repo.write_policy(&THREE_ADDONS.replace("  - name: cert-manager\n", ""));
  let result = apply(plan(&repo.policy(), &repo.existing()), false);

  assert_eq!(result.outcomes.len(), 1);
  assert_eq!(result.outcomes[0].change.name, "cert-manager");
  assert_eq!(result.succeeded(ChangeKind::Delete), 1);
  assert!(!repo.output_file("cert-manager").exists());
  assert!(repo.output_file("metrics-server").exists());
  assert_eq!(fs::read_to_string(repo.output_file("argo-cd")).unwrap(), argo_before);
}

#[test]
fn dry_run_leaves_filesystem_identical() {
  let repo = TestRepo::new();
  repo.write_policy(THREE_ADDONS);
  apply(plan(&repo.policy(), &repo.existing()), false);

  repo.write_policy(
    &THREE_ADDONS
      .replace("namespace: kube-system", "namespace: monitoring")
      .replace("  - name: cert-manager\n", "  - name: karpenter\n"),
  );
  let before = repo.snapshot();

  let result = run_update(&repo.settings, &UpdateOptions { dry_run: true }).unwrap();

  assert!(result.dry_run);
  assert_eq!(result.outcomes.len(), 3);
  assert!(
    result
      .outcomes
      .iter()
      .all(|o| matches!(o.status, EntryStatus::WouldApply))
  );
  assert_eq!(before, repo.snapshot());
}

#[test]
fn dry_run_reports_the_same_plan_as_apply() {
  let repo = TestRepo::new();
  repo.write_policy(THREE_ADDONS);

  let preview = run_update(&repo.settings, &UpdateOptions { dry_run: true }).unwrap();
  let real = run_update(&repo.settings, &UpdateOptions { dry_run: false }).unwrap();

  let entries = |r: &appsetgen_lib::plan::ApplyResult| {
    r.outcomes
      .iter()
      .map(|o| (o.change.name.clone(), o.change.kind, o.change.new_hash.clone()))
      .collect::<Vec<_>>()
  };
  assert_eq!(entries(&preview), entries(&real));
}

#[test]
fn hand_written_neighbours_survive_an_empty_policy() {
  let repo = TestRepo::new();
  repo.write_policy(THREE_ADDONS);
  apply(plan(&repo.policy(), &repo.existing()), false);
  fs::write(repo.settings.output_dir.join("bootstrap.yaml"), "kind: Application\n").unwrap();

  repo.write_policy("addons: []\n");
  let result = apply(plan(&repo.policy(), &repo.existing()), false);

  assert_eq!(result.succeeded(ChangeKind::Delete), 3);
  assert!(repo.settings.output_dir.join("bootstrap.yaml").exists());
}

#[test]
fn hand_edited_definition_is_restored() {
  let repo = TestRepo::new();
  repo.write_policy(THREE_ADDONS);
  apply(plan(&repo.policy(), &repo.existing()), false);

  let path = repo.output_file("argo-cd");
  let edited = fs::read_to_string(&path).unwrap().replace("selfHeal: true", "selfHeal: false");
  fs::write(&path, &edited).unwrap();

  let update = plan(&repo.policy(), &repo.existing());
  assert_eq!(update.changes.len(), 1);
  assert_eq!(update.changes[0].kind, ChangeKind::Update);
  apply(update, false);

  let policy = repo.policy();
  let expected = render_binding(&policy, policy.get("argo-cd").unwrap()).unwrap();
  assert_eq!(fs::read_to_string(&path).unwrap(), expected.content);
}

#[test]
fn written_files_carry_the_marker() {
  let repo = TestRepo::new();
  repo.write_policy(THREE_ADDONS);
  apply(plan(&repo.policy(), &repo.existing()), false);

  for name in ["argo-cd", "cert-manager", "metrics-server"] {
    let content = fs::read_to_string(repo.output_file(name)).unwrap();
    assert!(content.starts_with(GENERATED_MARKER), "{} lacks marker", name);
  }
}

#[test]
fn render_failure_does_not_block_other_entries() {
  let repo = TestRepo::new();
  repo.write_policy("addons:\n  - name: argo-cd\n  - name: cert-manager\n    namespace: cert-manager\n");

  let result = run_update(&repo.settings, &UpdateOptions::default()).unwrap();

  assert_eq!(result.render_failures.len(), 1);
  assert_eq!(result.render_failures[0].addon(), "argo-cd");
  assert!(!result.is_success());
  assert!(repo.output_file("cert-manager").exists());
  assert!(!repo.output_file("argo-cd").exists());
}

#[test]
fn non_utf8_neighbour_does_not_block_the_run() {
  let repo = TestRepo::new();
  repo.write_policy("addons:\n  - name: argo-cd\n    namespace: argocd\n");
  fs::create_dir_all(&repo.settings.output_dir).unwrap();
  let legacy = repo.settings.output_dir.join("legacy.yaml");
  fs::write(&legacy, [0xff, 0xfe, b'k']).unwrap();

  let result = run_update(&repo.settings, &UpdateOptions::default()).unwrap();

  assert!(result.is_success());
  assert!(repo.output_file("argo-cd").exists());
  assert_eq!(fs::read(&legacy).unwrap(), [0xff, 0xfe, b'k']);
}
