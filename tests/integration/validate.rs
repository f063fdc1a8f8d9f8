use doc_mgmt_deploy::test_utils::fixtures;
use predicates::prelude::*;

use crate::common::TestProject;

#[test]
fn test_validate_valid_stack() {
    let mut project = TestProject::new().unwrap();
    project.set_env("IMAGE_TAG", "1.4.2");

    let output = project
        .run(&["--stack", "dev", "validate", "--references"])
        .unwrap();
    output
        .assert_success()
        .assert_stdout_contains("✓ manifest")
        .assert_stdout_contains("✓ context: dev in 123456789012/us-east-1")
        .assert_stdout_contains(
            "✓ identity: system:serviceaccount:team-a:docmgmt-sa-x-docmgmt-x-team-a",
        )
        .assert_stdout_contains("✓ secrets: 6 present")
        .assert_stdout_contains("✓ references")
        .assert_stdout_contains("✓ cluster issuer: oidc.eks.us-east-1.amazonaws.com/id/ABC123")
        .assert_stdout_contains("Stack 'dev' is valid");
}

#[test]
fn test_validate_warns_about_image_tag() {
    let project = TestProject::new().unwrap();
    project
        .command()
        .args(["--stack", "prod", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("⚠ IMAGE_TAG is not set"));
}

#[test]
fn test_validate_stops_at_missing_secret() {
    let mut project = TestProject::new().unwrap();
    project.unset_env("AUTH__API_KEYS");

    let output = project.run(&["--stack", "dev", "validate"]).unwrap();
    output
        .assert_failure()
        .assert_stdout_contains("✗ secrets: Required configuration 'AUTH__API_KEYS' is not set");
    assert!(!output.stdout.contains("image tag"));
}

#[test]
fn test_validate_json_report() {
    let mut project = TestProject::new().unwrap();
    project.unset_env("NEW_RELIC_LICENSE_KEY");

    let output = project
        .run(&["--stack", "staging", "validate", "--format", "json"])
        .unwrap();
    output.assert_failure();
    let report = output.json();
    assert_eq!(report["valid"], false);
    assert_eq!(report["stack"], "staging");
    let last = report["checks"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["name"], "secrets");
    assert_eq!(last["ok"], false);
}

#[test]
fn test_validate_requires_vcluster_namespace_outside_prod() {
    let project = TestProject::new().unwrap();
    let manifest = fixtures::MANIFEST.replace("vClusterNamespace = \"team-a\"\n", "");
    project.write_manifest(&manifest).unwrap();

    project
        .run(&["--stack", "staging", "validate"])
        .unwrap()
        .assert_failure()
        .assert_stdout_contains("✗ context: Required configuration 'vClusterNamespace' is not set");

    project
        .run(&["--stack", "prod", "validate"])
        .unwrap()
        .assert_success();
}
