//! Release descriptor assembly.
//!
//! A [`ReleaseDescriptor`] is the complete input for one chart release: the
//! release settings (name, chart, namespace, atomic upgrade, timeout) and the
//! nested chart values. It only ever holds resolved strings; everything
//! asynchronous has been joined before [`assemble`] is called.
//!
//! The descriptor is serialized as-is for the release engine. For display,
//! [`ReleaseDescriptor::redacted`] replaces every secret with a placeholder.

mod engine;

pub use engine::{ReleaseEngine, ReleaseOutcome, RenderEngine};

use crate::annotations::AnnotationSet;
use crate::config::ProjectSettings;
use crate::constants::RELEASE_TIMEOUT_SECS;
use crate::context::StackContext;
use crate::core::{DeployError, Result};
use crate::secrets::SecretBundle;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Config map key carrying the deployed image tag.
pub const APP_VERSION_KEY: &str = "APP_VERSION";

/// Release settings plus chart values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseDescriptor {
    /// Release name
    pub name: String,
    /// Chart location
    pub chart: String,
    /// Target namespace
    pub namespace: String,
    /// Roll back on failure
    pub atomic: bool,
    /// Seconds the engine may wait for the release
    pub timeout: u32,
    /// Create the namespace if missing
    pub create_namespace: bool,
    /// Extra values files, applied before `values`
    pub value_files: Vec<String>,
    /// Inline chart values
    pub values: ChartValues,
}

/// Values handed to the chart. Keys follow the chart's own naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartValues {
    /// Namespace the chart templates into
    pub namespace: String,
    /// Workload settings
    pub deployment: DeploymentValues,
    /// Internal load balancer
    pub ingress: IngressValues,
    /// Internet-facing load balancer
    pub ingress_public: IngressValues,
    /// Secret data mounted into the pod
    pub secrets: SecretValues,
    /// Plain config map entries
    pub config_map: DataValues<BTreeMap<String, String>>,
    /// Service account bound to the execution role
    pub service_account: ServiceAccountValues,
}

/// Workload values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentValues {
    /// Container image
    pub image: ImageValues,
}

/// Container image coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageValues {
    /// Registry host
    pub registry: String,
    /// Repository name
    pub name: String,
    /// Omitted when no tag was supplied; the chart default applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// One ingress tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngressValues {
    /// Load balancer controller annotations
    pub annotations: AnnotationSet,
}

/// Secret values, keyed by the chart's secret name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretValues {
    /// The `internal` secret
    pub internal: DataValues<SecretBundle>,
}

/// A `data:` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataValues<T> {
    /// Block contents
    pub data: T,
}

/// Service account values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceAccountValues {
    /// ARN of the pod execution role
    pub role_arn: String,
}

/// Everything [`assemble`] merges.
#[derive(Debug, Clone)]
pub struct ReleaseInputs<'a> {
    /// Resolved stack identity
    pub ctx: &'a StackContext,
    /// Project settings from the manifest
    pub project: &'a ProjectSettings,
    /// Target namespace
    pub namespace: &'a str,
    /// Image tag, if any
    pub image_tag: Option<&'a str>,
    /// Annotations for the internal ingress
    pub internal_annotations: AnnotationSet,
    /// Annotations for the public ingress
    pub public_annotations: AnnotationSet,
    /// Resolved secrets
    pub secrets: SecretBundle,
    /// Pod execution role ARN
    pub role_arn: &'a str,
}

/// Merge resolved inputs into a release descriptor.
#[must_use]
pub fn assemble(inputs: ReleaseInputs<'_>) -> ReleaseDescriptor {
    let ReleaseInputs {
        ctx,
        project,
        namespace,
        image_tag,
        internal_annotations,
        public_annotations,
        secrets,
        role_arn,
    } = inputs;

    let tag = image_tag.filter(|t| !t.is_empty()).map(str::to_string);
    let version = tag.clone().unwrap_or_default();
    let config_map = BTreeMap::from([(APP_VERSION_KEY.to_string(), version)]);
    let values_file = format!("{}/{}-values.yaml", project.values_dir(), ctx.stack);

    let descriptor = ReleaseDescriptor {
        name: ctx.project.clone(),
        chart: project.chart.clone(),
        namespace: namespace.to_string(),
        atomic: true,
        timeout: RELEASE_TIMEOUT_SECS,
        create_namespace: true,
        value_files: vec![values_file],
        values: ChartValues {
            namespace: namespace.to_string(),
            deployment: DeploymentValues {
                image: ImageValues {
                    registry: ctx.registry_host(),
                    name: format!("{}-{}", ctx.project, ctx.stack),
                    tag,
                },
            },
            ingress: IngressValues {
                annotations: internal_annotations,
            },
            ingress_public: IngressValues {
                annotations: public_annotations,
            },
            secrets: SecretValues {
                internal: DataValues { data: secrets },
            },
            config_map: DataValues { data: config_map },
            service_account: ServiceAccountValues {
                role_arn: role_arn.to_string(),
            },
        },
    };

    tracing::info!(
        release = %descriptor.name,
        namespace = %descriptor.namespace,
        image = %descriptor.values.deployment.image.name,
        "assembled release descriptor"
    );
    descriptor
}

impl ReleaseDescriptor {
    /// Copy safe to print: every secret value replaced.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.values.secrets.internal.data = self.values.secrets.internal.data.redacted();
        copy
    }

    /// Image tag, if one was supplied.
    #[must_use]
    pub fn image_tag(&self) -> Option<&str> {
        self.values.deployment.image.tag.as_deref()
    }

    /// `sha256:<hex>` of the canonical JSON form.
    ///
    /// # Errors
    ///
    /// [`DeployError::Serialization`] if the descriptor cannot be rendered.
    pub fn digest(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self).map_err(|e| serialization_error(&e))?;
        Ok(format!("sha256:{}", hex::encode(Sha256::digest(&bytes))))
    }

    /// YAML rendering.
    ///
    /// # Errors
    ///
    /// [`DeployError::Serialization`] if rendering fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| serialization_error(&e))
    }

    /// Pretty JSON rendering.
    ///
    /// # Errors
    ///
    /// [`DeployError::Serialization`] if rendering fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| serialization_error(&e))
    }
}

fn serialization_error(e: &dyn std::error::Error) -> DeployError {
    DeployError::Serialization {
        what: "release descriptor".to_string(),
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::Tier;
    use crate::context::StackName;
    use crate::secrets::{SECRET_KEYS, SecretValue};

    fn ctx() -> StackContext {
        StackContext {
            stack: StackName::Dev,
            account_id: "123456789012".to_string(),
            region: "us-east-1".to_string(),
            project: "doc-mgmt".to_string(),
        }
    }

    fn project() -> ProjectSettings {
        crate::config::Manifest::from_toml("[project]\nname = \"doc-mgmt\"\n", "deploy.toml")
            .unwrap()
            .project
    }

    fn secrets() -> SecretBundle {
        SECRET_KEYS
            .iter()
            .map(|k| (k.to_string(), SecretValue::new(format!("value-of-{k}"))))
            .collect()
    }

    fn descriptor(tag: Option<&str>) -> ReleaseDescriptor {
        let ctx = ctx();
        let project = project();
        assemble(ReleaseInputs {
            ctx: &ctx,
            project: &project,
            namespace: "docmgmt",
            image_tag: tag,
            internal_annotations: AnnotationSet::base(Tier::Internal),
            public_annotations: AnnotationSet::base(Tier::Public),
            secrets: secrets(),
            role_arn: "arn:aws:iam::123456789012:role/dev-doc-mgmt-eks-pod-execution-role",
        })
    }

    #[test]
    fn test_release_settings() {
        let d = descriptor(Some("1.4.2"));
        assert_eq!(d.name, "doc-mgmt");
        assert_eq!(d.chart, "../k8s/helm");
        assert!(d.atomic);
        assert!(d.create_namespace);
        assert_eq!(d.timeout, 900);
        assert_eq!(d.value_files, vec!["../k8s/helm/dev-values.yaml"]);
    }

    #[test]
    fn test_chart_values_layout() {
        let d = descriptor(Some("1.4.2"));
        let value = serde_json::to_value(&d).unwrap();
        let values = &value["values"];
        assert_eq!(values["namespace"], "docmgmt");
        assert_eq!(
            values["deployment"]["image"]["registry"],
            "123456789012.dkr.ecr.us-east-1.amazonaws.com"
        );
        assert_eq!(values["deployment"]["image"]["name"], "doc-mgmt-dev");
        assert_eq!(values["deployment"]["image"]["tag"], "1.4.2");
        assert_eq!(values["config_map"]["data"]["APP_VERSION"], "1.4.2");
        assert_eq!(
            values["ingress"]["annotations"]["alb.ingress.kubernetes.io/scheme"],
            "internal"
        );
        assert_eq!(
            values["ingress_public"]["annotations"]["alb.ingress.kubernetes.io/scheme"],
            "internet-facing"
        );
        assert_eq!(
            values["secrets"]["internal"]["data"]["AUTH__API_KEYS"],
            "value-of-AUTH__API_KEYS"
        );
        assert_eq!(
            values["service_account"]["role_arn"],
            "arn:aws:iam::123456789012:role/dev-doc-mgmt-eks-pod-execution-role"
        );
    }

    #[test]
    fn test_config_map_carries_app_version() {
        let d = descriptor(Some("1.4.2"));
        assert_eq!(d.values.config_map.data.len(), 1);
        assert_eq!(d.values.config_map.data[APP_VERSION_KEY], "1.4.2");
    }

    #[test]
    fn test_missing_tag_leaves_version_empty() {
        for tag in [None, Some("")] {
            let d = descriptor(tag);
            assert_eq!(d.image_tag(), None);
            let value = serde_json::to_value(&d).unwrap();
            assert!(value["values"]["deployment"]["image"].get("tag").is_none());
            assert_eq!(value["values"]["config_map"]["data"]["APP_VERSION"], "");
        }
    }

    #[test]
    fn test_redacted_hides_every_secret() {
        let d = descriptor(Some("1.4.2"));
        let yaml = d.redacted().to_yaml().unwrap();
        assert!(!yaml.contains("value-of-"));
        assert!(yaml.contains("[redacted]"));
        assert_eq!(d.redacted().values.deployment, d.values.deployment);
    }

    #[test]
    fn test_digest_is_stable_and_content_sensitive() {
        let a = descriptor(Some("1.4.2"));
        let b = descriptor(Some("1.4.3"));
        assert_eq!(a.digest().unwrap(), a.clone().digest().unwrap());
        assert_ne!(a.digest().unwrap(), b.digest().unwrap());
        assert!(a.digest().unwrap().starts_with("sha256:"));
    }
}
