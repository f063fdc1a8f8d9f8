//! Sample project data.
//!
//! One fictional project, `doc-mgmt` in org `acme`, with `dev`, `staging` and
//! `prod` stacks. Every upstream output, secret and cloud lookup it needs is
//! available from the in-memory helpers, and [`ProjectFixture`] writes the
//! same data in the on-disk formats the CLI reads.

use crate::annotations::{AnnotationSet, Tier};
use crate::config::Manifest;
use crate::context::{StackContext, StackName};
use crate::deployment::Deployment;
use crate::provider::StaticProvider;
use crate::references::{MemoryReferenceStore, StackReference, keys};
use crate::release::{ReleaseDescriptor, ReleaseInputs, assemble};
use crate::secrets::{MemorySecrets, SECRET_KEYS, SecretBundle, SecretValue};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub const ORG: &str = "acme";
pub const PROJECT: &str = "doc-mgmt";
pub const NAMESPACE: &str = "docmgmt";
pub const VCLUSTER_NAMESPACE: &str = "team-a";
pub const ACCOUNT_ID: &str = "123456789012";
pub const REGION: &str = "us-east-1";
pub const SHARED_CLUSTER: &str = "shared-eks";
pub const PROD_CLUSTER: &str = "prod-eks";
pub const ISSUER: &str = "https://oidc.eks.us-east-1.amazonaws.com/id/ABC123";
pub const SECURITY_GROUP_ID: &str = "sg-0123456789abcdef0";
pub const CERT_ARN: &str =
    "arn:aws:acm:us-east-1:123456789012:certificate/00000000-0000-0000-0000-000000000000";
pub const PROD_INTERNAL_DNS: &str = "internal-prod-internal-apps-1.us-east-1.elb.amazonaws.com";
pub const PROD_PUBLIC_DNS: &str = "prod-public-apps-1.us-east-1.elb.amazonaws.com";
/// Every fixture secret value starts with this.
pub const SECRET_PLACEHOLDER_PREFIX: &str = "secret-value-";

/// `deploy.toml` for the sample project.
pub const MANIFEST: &str = r#"[project]
name = "doc-mgmt"

[stacks.dev]
namespace = "docmgmt"
org = "acme"
eksClusterName = "shared-eks"
s3AccessTo = ["arn:aws:s3:::acme-shared-exports"]
vClusterNamespace = "team-a"
accountId = "123456789012"
region = "us-east-1"

[stacks.staging]
namespace = "docmgmt"
org = "acme"
eksClusterName = "shared-eks"
s3AccessTo = ["arn:aws:s3:::acme-shared-exports"]
vClusterNamespace = "team-a"
accountId = "123456789012"
region = "us-east-1"

[stacks.prod]
namespace = "docmgmt"
org = "acme"
eksClusterName = "prod-eks"
s3AccessTo = ["arn:aws:s3:::acme-prod-exports", "arn:aws:s3:::acme-prod-exports/*"]
accountId = "123456789012"
region = "us-east-1"
"#;

/// Parsed [`MANIFEST`].
pub fn manifest() -> Manifest {
    Manifest::from_toml(MANIFEST, "deploy.toml").expect("fixture manifest parses")
}

pub fn context(stack: StackName) -> StackContext {
    StackContext {
        stack,
        account_id: ACCOUNT_ID.to_string(),
        region: REGION.to_string(),
        project: PROJECT.to_string(),
    }
}

pub fn stack_reference(stack: &StackName) -> StackReference {
    StackReference::new(ORG, PROJECT, stack.as_str())
}

/// Upstream outputs published by the infra stack for `stack`.
pub fn reference_outputs(stack: &StackName) -> Vec<(&'static str, String)> {
    let table = |name: &str| format!("arn:aws:dynamodb:{REGION}:{ACCOUNT_ID}:table/{stack}-{name}");
    vec![
        (keys::SECURITY_GROUP_ID, SECURITY_GROUP_ID.to_string()),
        (keys::DOCUMENTS_ARN, table("Documents")),
        (keys::ENVELOPE_CALLBACKS_ARN, table("EnvelopeCallbacks")),
        (keys::ENVELOPES_ARN, table("Envelopes")),
        (
            keys::BUCKET_ARN,
            format!("arn:aws:s3:::acme-{stack}-documents"),
        ),
        (
            keys::TEMPLATES_BUCKET_ARN,
            format!("arn:aws:s3:::acme-{stack}-templates"),
        ),
        (keys::CERT_ARN_WEBHOOK, CERT_ARN.to_string()),
    ]
}

/// Store holding every output for `stack`.
pub fn references(stack: StackName) -> MemoryReferenceStore {
    let reference = stack_reference(&stack);
    reference_outputs(&stack)
        .into_iter()
        .fold(MemoryReferenceStore::new(), |store, (key, value)| {
            store.with_output(&reference, key, value)
        })
}

/// Fixture value of secret `key`.
pub fn secret_value(key: &str) -> String {
    format!("{SECRET_PLACEHOLDER_PREFIX}{key}")
}

pub fn secrets() -> MemorySecrets {
    SECRET_KEYS
        .iter()
        .fold(MemorySecrets::new(), |source, key| {
            source.with(*key, secret_value(key))
        })
}

pub fn secret_bundle() -> SecretBundle {
    SECRET_KEYS
        .iter()
        .map(|key| (key.to_string(), SecretValue::new(secret_value(key))))
        .collect()
}

/// Provider knowing both clusters and the production load balancers.
pub fn provider() -> StaticProvider {
    StaticProvider::new()
        .with_cluster(SHARED_CLUSTER, ISSUER)
        .with_cluster(PROD_CLUSTER, ISSUER)
        .with_load_balancer("prod-internal-apps", PROD_INTERNAL_DNS)
        .with_load_balancer("prod-public-apps", PROD_PUBLIC_DNS)
        .with_zone_id(REGION, "Z35SXDOTRQ7X7K")
}

/// A ready-to-run deployment for `stack`, plus its provider for call counting.
pub fn deployment(stack: StackName) -> (Deployment, Arc<StaticProvider>) {
    let store = references(stack.clone());
    deployment_with_references(stack, store)
}

pub fn deployment_with_references(
    stack: StackName,
    store: MemoryReferenceStore,
) -> (Deployment, Arc<StaticProvider>) {
    super::init_test_logging(None);

    let manifest = manifest();
    let config = manifest
        .stack(&stack)
        .and_then(|table| table.resolve(&stack))
        .expect("fixture stack is configured");
    let provider = Arc::new(provider());

    let deployment = Deployment::new(
        context(stack),
        manifest.project,
        config,
        Arc::new(store),
        Arc::new(secrets()),
        provider.clone(),
    );
    (deployment, provider)
}

/// Descriptor with base annotations and fixture secrets.
pub fn descriptor(stack: StackName) -> ReleaseDescriptor {
    super::init_test_logging(None);

    let ctx = context(stack.clone());
    let project = manifest().project;
    assemble(ReleaseInputs {
        ctx: &ctx,
        project: &project,
        namespace: NAMESPACE,
        image_tag: Some("1.4.2"),
        internal_annotations: AnnotationSet::base(Tier::Internal),
        public_annotations: AnnotationSet::base(Tier::Public),
        secrets: secret_bundle(),
        role_arn: &format!(
            "arn:aws:iam::{ACCOUNT_ID}:role/{stack}-{PROJECT}-eks-pod-execution-role"
        ),
    })
}

/// On-disk project: `deploy.toml`, exported stack outputs and a cloud inventory.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    pub manifest: String,
    pub stacks: Vec<StackName>,
    pub inventory: String,
}

impl ProjectFixture {
    /// The sample project with outputs for every stack.
    pub fn sample() -> Self {
        Self {
            manifest: MANIFEST.to_string(),
            stacks: vec![StackName::Dev, StackName::Staging, StackName::Prod],
            inventory: inventory_yaml(),
        }
    }

    /// Write `deploy.toml`, `inventory.yaml` and `.stack-outputs/` under `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<()> {
        fs::write(dir.join("deploy.toml"), &self.manifest).context("writing deploy.toml")?;
        fs::write(dir.join("inventory.yaml"), &self.inventory).context("writing inventory.yaml")?;

        for stack in &self.stacks {
            let reference = stack_reference(stack);
            let path = dir
                .join(".stack-outputs")
                .join(reference.org())
                .join(reference.infra_project())
                .join(format!("{stack}.json"));
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            let outputs: serde_json::Map<String, serde_json::Value> = reference_outputs(stack)
                .into_iter()
                .map(|(key, value)| (key.to_string(), serde_json::Value::String(value)))
                .collect();
            fs::write(&path, serde_json::to_string_pretty(&outputs)?)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        Ok(())
    }
}

/// Inventory YAML matching [`provider`].
pub fn inventory_yaml() -> String {
    let inventory = serde_json::json!({
        "clusters": {
            SHARED_CLUSTER: { "oidcIssuer": ISSUER },
            PROD_CLUSTER: { "oidcIssuer": ISSUER },
        },
        "loadBalancers": {
            "prod-internal-apps": { "dnsName": PROD_INTERNAL_DNS },
            "prod-public-apps": { "dnsName": PROD_PUBLIC_DNS },
        },
    });
    serde_yaml::to_string(&inventory).expect("fixture inventory serializes")
}
