use doc_mgmt_deploy::test_utils::fixtures;

use crate::common::TestProject;

#[test]
fn test_deploy_prod_exports_load_balancers() {
    let mut project = TestProject::new().unwrap();
    project.set_env("IMAGE_TAG", "1.4.2");

    let output = project.run(&["--stack", "prod", "deploy"]).unwrap();
    output.assert_success();
    let exported = output.json();

    assert_eq!(
        exported["saRoleArn"],
        "arn:aws:iam::123456789012:role/prod-doc-mgmt-eks-pod-execution-role"
    );
    assert_eq!(exported["helm_id"], "docmgmt/doc-mgmt");
    assert_eq!(exported["helm_status"], "rendered");
    assert_eq!(exported["internalAlbDnsName"], fixtures::PROD_INTERNAL_DNS);
    assert_eq!(exported["publicAlbDnsName"], fixtures::PROD_PUBLIC_DNS);
    assert_eq!(exported["albZoneId"], "Z35SXDOTRQ7X7K");

    let rendered = project.project_path().join(".rendered/doc-mgmt-prod.yaml");
    let written = std::fs::read_to_string(rendered).unwrap();
    assert!(written.contains(&fixtures::secret_value("AUTH__API_KEYS")));
}

#[test]
fn test_deploy_non_prod_exports_empty_lookups() {
    let project = TestProject::new().unwrap();
    let output = project
        .run(&["--stack", "dev", "deploy", "--redact-secrets"])
        .unwrap();
    output.assert_success();
    let exported = output.json();

    assert_eq!(exported["internalAlbDnsName"], "");
    assert_eq!(exported["publicAlbDnsName"], "");
    assert_eq!(exported["albZoneId"], "");

    let rendered = project.project_path().join(".rendered/doc-mgmt-dev.yaml");
    let written = std::fs::read_to_string(rendered).unwrap();
    assert!(!written.contains(fixtures::SECRET_PLACEHOLDER_PREFIX));
}

#[test]
fn test_deploy_prod_fails_without_load_balancer() {
    let project = TestProject::new().unwrap();
    std::fs::write(
        project.project_path().join("inventory.yaml"),
        format!(
            "clusters:\n  prod-eks:\n    oidcIssuer: {}\n",
            fixtures::ISSUER
        ),
    )
    .unwrap();

    project
        .run(&["--stack", "prod", "deploy"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Lookup of load balancer prod-");
}

#[test]
fn test_deploy_custom_out_dir() {
    let project = TestProject::new().unwrap();
    project
        .run(&[
            "--stack",
            "staging",
            "deploy",
            "--out-dir",
            "build/releases",
        ])
        .unwrap()
        .assert_success();
    let out_dir = project.project_path().join("build/releases");
    assert!(out_dir.join("doc-mgmt-staging.yaml").exists());
}
