use crate::common::TestProject;

#[test]
fn test_execution_policy() {
    let project = TestProject::new().unwrap();
    let output = project.run(&["--stack", "dev", "policy"]).unwrap();
    output.assert_success();
    let doc = output.json();

    assert_eq!(doc["Version"], "2012-10-17");
    let statements = doc["Statement"].as_array().unwrap();
    assert_eq!(statements.len(), 4);
    assert_eq!(statements[0]["Sid"], "AccessTable");
    assert_eq!(statements[0]["Action"], "dynamodb:*");
    assert_eq!(
        statements[1]["Resource"],
        serde_json::json!([
            "arn:aws:s3:::acme-dev-documents",
            "arn:aws:s3:::acme-dev-documents/*",
        ])
    );
    assert_eq!(statements[2]["Sid"], "TemplatesReadOnly");
    assert_eq!(
        statements[3]["Resource"],
        serde_json::json!(["arn:aws:s3:::acme-shared-exports"])
    );
}

#[test]
fn test_trust_policy_condition() {
    let project = TestProject::new().unwrap();
    let output = project
        .run(&["--stack", "dev", "policy", "--kind", "trust"])
        .unwrap();
    output.assert_success();
    let statement = &output.json()["Statement"][0];

    assert_eq!(statement["Action"], "sts:AssumeRoleWithWebIdentity");
    assert_eq!(
        statement["Principal"]["Federated"],
        "arn:aws:iam::123456789012:oidc-provider/oidc.eks.us-east-1.amazonaws.com/id/ABC123"
    );
    assert_eq!(
        statement["Condition"]["StringEquals"]["oidc.eks.us-east-1.amazonaws.com/id/ABC123:sub"],
        "system:serviceaccount:team-a:docmgmt-sa-x-docmgmt-x-team-a"
    );
}

#[test]
fn test_role_definition() {
    let project = TestProject::new().unwrap();
    let output = project
        .run(&["--stack", "prod", "policy", "--kind", "role"])
        .unwrap();
    output.assert_success();
    let artifacts = output.json();

    assert_eq!(
        artifacts["policy"]["name"],
        "prod-doc-mgmt-pod-execution-policy"
    );
    assert_eq!(
        artifacts["role"]["name"],
        "prod-doc-mgmt-eks-pod-execution-role"
    );
    let managed = artifacts["role"]["managedPolicyArns"].as_array().unwrap();
    assert_eq!(managed.len(), 3);
    assert_eq!(managed[2], artifacts["policy"]["arn"]);
    assert_eq!(
        artifacts["identity"],
        "system:serviceaccount:docmgmt:docmgmt-sa"
    );
}

#[test]
fn test_empty_access_list_rejected() {
    let project = TestProject::new().unwrap();
    let manifest = doc_mgmt_deploy::test_utils::fixtures::MANIFEST.replace(
        r#"s3AccessTo = ["arn:aws:s3:::acme-shared-exports"]"#,
        "s3AccessTo = []",
    );
    project.write_manifest(&manifest).unwrap();

    project
        .run(&["--stack", "dev", "policy"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("s3AccessTo");
}
