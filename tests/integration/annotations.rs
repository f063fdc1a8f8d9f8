use doc_mgmt_deploy::test_utils::fixtures;

use crate::common::TestProject;

const SECURITY_GROUPS: &str = "alb.ingress.kubernetes.io/security-groups";
const HOSTNAME: &str = "external-dns.alpha.kubernetes.io/hostname";
const CERTIFICATE: &str = "alb.ingress.kubernetes.io/certificate-arn";
const LB_NAME: &str = "alb.ingress.kubernetes.io/load-balancer-name";
const MANAGE_SG_RULES: &str = "alb.ingress.kubernetes.io/manage-backend-security-group-rules";

#[test]
fn test_dev_annotations() {
    let project = TestProject::new().unwrap();
    let output = project
        .run(&["--stack", "dev", "annotations", "--format", "json"])
        .unwrap();
    output.assert_success();
    let sets = output.json();

    assert_eq!(sets["internal"][LB_NAME], "vcluster-internal-apps");
    assert_eq!(sets["public"][LB_NAME], "vcluster-public-apps");
    assert_eq!(
        sets["internal"][HOSTNAME],
        "dev-doc-mgmt.prime.coverwhale.dev."
    );
    assert_eq!(
        sets["public"][HOSTNAME],
        "dev-webhook-doc-mgmt.prime.coverwhale.dev."
    );
    assert_eq!(sets["public"][SECURITY_GROUPS], fixtures::SECURITY_GROUP_ID);
    assert!(sets["internal"].get(SECURITY_GROUPS).is_none());
}

#[test]
fn test_staging_public_has_no_security_group() {
    let project = TestProject::new().unwrap();
    let output = project
        .run(&[
            "--stack",
            "staging",
            "annotations",
            "--tier",
            "public",
            "--format",
            "json",
        ])
        .unwrap();
    output.assert_success();
    let sets = output.json();

    assert!(sets.get("internal").is_none());
    assert!(sets["public"].get(SECURITY_GROUPS).is_none());
    assert_eq!(sets["public"][MANAGE_SG_RULES], "true");
}

#[test]
fn test_prod_annotations_use_dedicated_load_balancers() {
    let project = TestProject::new().unwrap();
    let output = project
        .run(&["--stack", "prod", "annotations", "--format", "json"])
        .unwrap();
    output.assert_success();
    let sets = output.json();

    for tier in ["internal", "public"] {
        assert_eq!(sets[tier][CERTIFICATE], fixtures::CERT_ARN);
        assert_eq!(sets[tier][LB_NAME], format!("prod-{tier}-apps"));
        assert!(sets[tier].get(HOSTNAME).is_none());
    }
    assert_eq!(sets["public"][SECURITY_GROUPS], fixtures::SECURITY_GROUP_ID);
}

#[test]
fn test_text_output_lists_applied_rules() {
    let project = TestProject::new().unwrap();
    project
        .run(&["--stack", "dev", "annotations", "--tier", "public"])
        .unwrap()
        .assert_success()
        .assert_stdout_contains("public: (shared-vcluster, dev-security-group)")
        .assert_stdout_contains("  alb.ingress.kubernetes.io/scheme: internet-facing");
}
