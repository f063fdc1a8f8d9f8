use doc_mgmt_deploy::test_utils::fixtures;
use predicates::prelude::*;

use crate::common::TestProject;

#[test]
fn test_identity_dev_uses_vcluster_form() {
    let project = TestProject::new().unwrap();
    project
        .command()
        .args(["--stack", "dev", "identity"])
        .assert()
        .success()
        .stdout("system:serviceaccount:team-a:docmgmt-sa-x-docmgmt-x-team-a\n");
}

#[test]
fn test_identity_prod_uses_namespace_form() {
    let project = TestProject::new().unwrap();
    project
        .command()
        .args(["identity", "--stack", "prod"])
        .assert()
        .success()
        .stdout("system:serviceaccount:docmgmt:docmgmt-sa\n");
}

#[test]
fn test_identity_reads_stack_from_env() {
    let mut project = TestProject::new().unwrap();
    project.set_env("DEPLOY_STACK", "staging");
    project
        .command()
        .arg("identity")
        .assert()
        .success()
        .stdout(predicate::str::contains("-x-docmgmt-x-team-a"));
}

#[test]
fn test_identity_does_not_need_secrets_or_outputs() {
    let project = TestProject::empty().unwrap();
    project.write_manifest(fixtures::MANIFEST).unwrap();

    let output = project.run(&["--stack", "prod", "identity"]).unwrap();
    output
        .assert_success()
        .assert_stdout_contains("system:serviceaccount:docmgmt:docmgmt-sa");
}
