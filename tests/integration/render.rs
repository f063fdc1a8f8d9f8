use doc_mgmt_deploy::test_utils::fixtures;
use predicates::prelude::*;

use crate::common::TestProject;

fn yaml(text: &str) -> serde_yaml::Value {
    serde_yaml::from_str(text).unwrap_or_else(|e| panic!("not YAML ({e}):\n{text}"))
}

#[test]
fn test_render_redacts_secrets_by_default() {
    let mut project = TestProject::new().unwrap();
    project.set_env("IMAGE_TAG", "1.4.2");

    let output = project.run(&["--stack", "dev", "render"]).unwrap();
    output.assert_success();
    assert!(!output.stdout.contains(fixtures::SECRET_PLACEHOLDER_PREFIX));

    let descriptor = yaml(&output.stdout);
    let values = &descriptor["values"];
    assert_eq!(descriptor["name"], "doc-mgmt");
    assert_eq!(descriptor["namespace"], "docmgmt");
    assert_eq!(descriptor["atomic"], true);
    assert_eq!(descriptor["timeout"], 900);
    assert_eq!(descriptor["createNamespace"], true);
    assert_eq!(descriptor["valueFiles"][0], "../k8s/helm/dev-values.yaml");
    assert_eq!(values["deployment"]["image"]["name"], "doc-mgmt-dev");
    assert_eq!(values["deployment"]["image"]["tag"], "1.4.2");
    assert_eq!(values["config_map"]["data"]["APP_VERSION"], "1.4.2");
    assert_eq!(
        values["secrets"]["internal"]["data"]["NEW_RELIC_LICENSE_KEY"],
        "[redacted]"
    );
    assert_eq!(
        values["service_account"]["role_arn"],
        "arn:aws:iam::123456789012:role/dev-doc-mgmt-eks-pod-execution-role"
    );
}

#[test]
fn test_render_show_secrets_as_json() {
    let project = TestProject::new().unwrap();
    let output = project
        .run(&[
            "--stack",
            "staging",
            "render",
            "--format",
            "json",
            "--show-secrets",
        ])
        .unwrap();
    output.assert_success();

    let descriptor = output.json();
    assert_eq!(
        descriptor["values"]["secrets"]["internal"]["data"]["AUTH__API_KEYS"],
        fixtures::secret_value("AUTH__API_KEYS")
    );
}

#[test]
fn test_render_without_image_tag() {
    let project = TestProject::new().unwrap();
    let output = project
        .run(&["--stack", "dev", "render", "--format", "json"])
        .unwrap();
    output
        .assert_success()
        .assert_stderr_contains("IMAGE_TAG is not set");

    let values = &output.json()["values"];
    assert!(values["deployment"]["image"].get("tag").is_none());
    assert_eq!(values["config_map"]["data"]["APP_VERSION"], "");
}

#[test]
fn test_render_require_image_tag() {
    let project = TestProject::new().unwrap();
    project
        .command()
        .args(["--stack", "dev", "render", "--require-image-tag"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Required configuration 'IMAGE_TAG' is not set"));
}

#[test]
fn test_render_to_file() {
    let mut project = TestProject::new().unwrap();
    project.set_env("IMAGE_TAG", "2.0.0");

    project
        .command()
        .args(["--stack", "prod", "render", "--output", "release.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Rendered release.yaml"));

    let written = std::fs::read_to_string(project.project_path().join("release.yaml")).unwrap();
    let descriptor = yaml(&written);
    assert_eq!(
        descriptor["values"]["deployment"]["image"]["name"],
        "doc-mgmt-prod"
    );
    assert_eq!(descriptor["valueFiles"][0], "../k8s/helm/prod-values.yaml");
}

#[test]
fn test_render_missing_secret() {
    let mut project = TestProject::new().unwrap();
    project.unset_env("DOCU_SIGN__PRIVATE_KEY_ENCODED");

    project
        .run(&["--stack", "dev", "render"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("DOCU_SIGN__PRIVATE_KEY_ENCODED");
}

#[test]
fn test_render_with_secrets_prefix() {
    let mut project = TestProject::new().unwrap();
    for key in doc_mgmt_deploy::secrets::SECRET_KEYS {
        project.unset_env(key);
        project.set_env(&format!("DOCMGMT_{key}"), "prefixed");
    }

    let output = project
        .run(&[
            "--stack",
            "dev",
            "render",
            "--secrets-prefix",
            "DOCMGMT_",
            "--show-secrets",
            "--format",
            "json",
        ])
        .unwrap();
    output.assert_success();
    let data = &output.json()["values"]["secrets"]["internal"]["data"];
    assert_eq!(data["AUTH__API_KEYS"], "prefixed");
}
