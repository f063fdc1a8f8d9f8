use predicates::prelude::*;

use crate::common::TestProject;

#[test]
fn test_missing_manifest() {
    let project = TestProject::empty().unwrap();
    project
        .command()
        .args(["--stack", "dev", "identity"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("deploy.toml not found"));
}

#[test]
fn test_missing_stack() {
    let project = TestProject::new().unwrap();
    project
        .run(&["identity"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Required configuration 'stack' is not set");
}

#[test]
fn test_unknown_stack_table() {
    let project = TestProject::new().unwrap();
    project
        .run(&["--stack", "qa", "identity"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Required configuration 'stacks.qa' is not set");
}

#[test]
fn test_malformed_account_id() {
    let project = TestProject::new().unwrap();
    project
        .run(&["--stack", "dev", "--account-id", "42", "identity"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Invalid configuration 'accountId'");
}

#[test]
fn test_missing_upstream_output_aborts_run() {
    let project = TestProject::new().unwrap();
    project.remove_output("dev", "certArnWebHook").unwrap();

    project
        .run(&["--stack", "dev", "deploy"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains(
            "Output 'certArnWebHook' not found in stack 'acme/doc-mgmt-infra/dev'",
        );
    assert!(!project.project_path().join(".rendered").exists());
}

#[test]
fn test_missing_outputs_file() {
    let project = TestProject::new().unwrap();
    std::fs::remove_file(project.outputs_file("staging")).unwrap();

    project
        .run(&["--stack", "staging", "annotations"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("not found in stack 'acme/doc-mgmt-infra/staging'");
}

#[test]
fn test_missing_inventory() {
    let project = TestProject::new().unwrap();
    std::fs::remove_file(project.project_path().join("inventory.yaml")).unwrap();

    project
        .run(&["--stack", "dev", "render"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("inventory");
}

#[test]
fn test_unknown_cluster() {
    let project = TestProject::new().unwrap();
    std::fs::write(
        project.project_path().join("inventory.yaml"),
        "clusters: {}\n",
    )
    .unwrap();

    project
        .run(&["--stack", "dev", "policy", "--kind", "trust"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Lookup of cluster shared-eks failed");
}
