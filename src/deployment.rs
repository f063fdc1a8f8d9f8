//! One deployment run, from resolved configuration to exported values.
//!
//! ```text
//!   StackContext + stack config
//!            |
//!   +--------+---------+-------------+
//!   | references       | secrets     | cluster OIDC issuer      (concurrent)
//!   +--------+---------+-------------+
//!            | join
//!   annotations (internal, public) + IAM policy/role
//!            |
//!   release descriptor -> ReleaseEngine -> post-release lookups
//! ```
//!
//! Every fetch feeding the descriptor is joined before anything is built, and
//! any failure aborts the run. There is no partial success.

use crate::annotations::{AnnotationInputs, AnnotationSet, Tier, compose};
use crate::config::{ProjectSettings, ResolvedStackConfig};
use crate::context::StackContext;
use crate::core::{DeployError, Result};
use crate::iam::{IamArtifacts, ServiceAccountIdentity};
use crate::post_release::{self, PostReleaseOutputs};
use crate::provider::CloudProvider;
use crate::references::{ReferenceStore, StackReference, UpstreamRefs};
use crate::release::{ReleaseDescriptor, ReleaseEngine, ReleaseInputs, assemble};
use crate::secrets::{SecretBundle, SecretSource};
use serde::Serialize;
use std::sync::Arc;

/// A configured run for one stack.
pub struct Deployment {
    ctx: StackContext,
    project: ProjectSettings,
    stack: ResolvedStackConfig,
    references: Arc<dyn ReferenceStore>,
    secrets: Arc<dyn SecretSource>,
    provider: Arc<dyn CloudProvider>,
    image_tag: Option<String>,
    require_image_tag: bool,
}

/// Everything built before the release engine is called.
#[derive(Debug, Clone)]
pub struct PreparedRelease {
    /// Resolved cross-stack outputs
    pub references: UpstreamRefs,
    /// Execution policy, role and identity
    pub iam: IamArtifacts,
    /// Descriptor handed to the release engine
    pub descriptor: ReleaseDescriptor,
}

/// Values exported by a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackOutputs {
    /// ARN of the pod execution role
    #[serde(rename = "saRoleArn")]
    pub sa_role_arn: String,
    /// Release identifier reported by the engine
    pub helm_id: String,
    /// Release status reported by the engine
    pub helm_status: String,
    /// DNS name of the internal load balancer
    #[serde(rename = "internalAlbDnsName")]
    pub internal_alb_dns_name: String,
    /// DNS name of the internet-facing load balancer
    #[serde(rename = "publicAlbDnsName")]
    pub public_alb_dns_name: String,
    /// Load balancer hosted zone; empty outside production
    #[serde(rename = "albZoneId")]
    pub alb_zone_id: String,
}

impl Deployment {
    pub fn new(
        ctx: StackContext,
        project: ProjectSettings,
        stack: ResolvedStackConfig,
        references: Arc<dyn ReferenceStore>,
        secrets: Arc<dyn SecretSource>,
        provider: Arc<dyn CloudProvider>,
    ) -> Self {
        Self {
            ctx,
            project,
            stack,
            references,
            secrets,
            provider,
            image_tag: None,
            require_image_tag: false,
        }
    }

    /// Image tag to deploy. Empty counts as unset.
    #[must_use]
    pub fn with_image_tag(mut self, tag: Option<String>) -> Self {
        self.image_tag = tag;
        self
    }

    /// Fail instead of warning when no image tag is set.
    #[must_use]
    pub fn require_image_tag(mut self, required: bool) -> Self {
        self.require_image_tag = required;
        self
    }

    pub fn context(&self) -> &StackContext {
        &self.ctx
    }

    pub fn stack_config(&self) -> &ResolvedStackConfig {
        &self.stack
    }

    /// The infra stack this run reads outputs from.
    #[must_use]
    pub fn reference(&self) -> StackReference {
        StackReference::new(&self.stack.org, &self.ctx.project, self.ctx.stack.as_str())
    }

    /// Service-account identity of this run.
    ///
    /// # Errors
    ///
    /// See [`ServiceAccountIdentity::for_stack`].
    pub fn identity(&self) -> Result<ServiceAccountIdentity> {
        ServiceAccountIdentity::for_stack(
            &self.ctx.stack,
            &self.stack.namespace,
            self.stack.v_cluster_namespace.as_deref(),
        )
    }

    /// Resolve every upstream reference.
    ///
    /// # Errors
    ///
    /// [`DeployError::ReferenceNotFound`] for the first missing output.
    pub async fn resolve_references(&self) -> Result<UpstreamRefs> {
        UpstreamRefs::resolve(self.references.as_ref(), &self.reference()).await
    }

    /// Annotation set for `tier`.
    #[must_use]
    pub fn annotations(&self, refs: &UpstreamRefs, tier: Tier) -> AnnotationSet {
        let inputs = AnnotationInputs::resolved(&self.ctx.stack, refs, &self.project);
        compose(tier, &inputs)
    }

    /// Build the IAM policy and role. Fetches references and the issuer concurrently.
    ///
    /// # Errors
    ///
    /// Reference, lookup and IAM build failures.
    pub async fn iam_artifacts(&self) -> Result<IamArtifacts> {
        let (refs, issuer) = tokio::try_join!(self.resolve_references(), self.cluster_issuer())?;
        IamArtifacts::build(&self.ctx, &self.stack, &refs, &issuer)
    }

    /// Join every input and build the release descriptor.
    ///
    /// # Errors
    ///
    /// The first failure among the fetches or builders.
    pub async fn prepare(&self) -> Result<PreparedRelease> {
        let image_tag = self.image_tag()?;

        let (references, secrets, issuer) = tokio::try_join!(
            self.resolve_references(),
            SecretBundle::fetch(self.secrets.as_ref()),
            self.cluster_issuer(),
        )?;

        let iam = IamArtifacts::build(&self.ctx, &self.stack, &references, &issuer)?;
        let descriptor = assemble(ReleaseInputs {
            ctx: &self.ctx,
            project: &self.project,
            namespace: &self.stack.namespace,
            image_tag,
            internal_annotations: self.annotations(&references, Tier::Internal),
            public_annotations: self.annotations(&references, Tier::Public),
            secrets,
            role_arn: &iam.role.arn,
        });

        Ok(PreparedRelease {
            references,
            iam,
            descriptor,
        })
    }

    /// Prepare, hand the descriptor to `engine`, then run the post-release lookups.
    ///
    /// # Errors
    ///
    /// Preparation, engine and lookup failures.
    pub async fn run(&self, engine: &dyn ReleaseEngine) -> Result<StackOutputs> {
        let prepared = self.prepare().await?;
        let outcome = engine.apply(&prepared.descriptor).await?;
        tracing::info!(id = %outcome.id, status = %outcome.status, "release applied");

        let PostReleaseOutputs {
            internal_alb_dns_name,
            public_alb_dns_name,
            alb_zone_id,
        } = post_release::lookup(&self.ctx, self.provider.as_ref(), &outcome)
            .await?;

        Ok(StackOutputs {
            sa_role_arn: prepared.iam.role.arn,
            helm_id: outcome.id,
            helm_status: outcome.status,
            internal_alb_dns_name,
            public_alb_dns_name,
            alb_zone_id,
        })
    }

    async fn cluster_issuer(&self) -> Result<String> {
        self.provider
            .cluster_oidc_issuer(&self.stack.eks_cluster_name)
            .await
    }

    fn image_tag(&self) -> Result<Option<&str>> {
        let tag = self.image_tag.as_deref().map(str::trim);
        match tag.filter(|t| !t.is_empty()) {
            Some(tag) => Ok(Some(tag)),
            None if self.require_image_tag => {
                Err(DeployError::missing("IMAGE_TAG", "--image-tag or IMAGE_TAG"))
            }
            None => {
                tracing::warn!(
                    "IMAGE_TAG is not set; using the chart default tag and an empty APP_VERSION"
                );
                Ok(None)
            }
        }
    }
}
