//! Lookups that only make sense once a release has been applied.
//!
//! Production stacks own dedicated load balancers, created by the ingress
//! controller while the release rolls out. Their DNS names and the region's
//! ALB hosted-zone id are exported for DNS records downstream. Other stacks
//! share the virtual cluster's load balancers and export nothing; no lookup is
//! made for them.

use crate::annotations::Tier;
use crate::context::StackContext;
use crate::core::{DeployError, Result};
use crate::provider::CloudProvider;
use crate::release::ReleaseOutcome;
use serde::Serialize;

/// Values exported after the release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostReleaseOutputs {
    /// DNS name of the internal load balancer
    pub internal_alb_dns_name: String,
    /// DNS name of the internet-facing load balancer
    pub public_alb_dns_name: String,
    /// Canonical hosted zone of the load balancers; empty outside production
    pub alb_zone_id: String,
}

/// Load balancer name the ingress controller uses for `tier` in production.
#[must_use]
pub fn production_load_balancer(ctx: &StackContext, tier: Tier) -> String {
    format!("{}-{tier}-apps", ctx.stack)
}

/// Look up the exported values for `ctx`, after `outcome` was reported.
///
/// # Errors
///
/// [`DeployError::Lookup`] in production when any lookup fails or returns an
/// empty value.
pub async fn lookup(
    ctx: &StackContext,
    provider: &dyn CloudProvider,
    outcome: &ReleaseOutcome,
) -> Result<PostReleaseOutputs> {
    if !ctx.stack.is_production() {
        tracing::debug!(
            stack = %ctx.stack,
            release = %outcome.id,
            "no post-release lookups outside production"
        );
        return Ok(PostReleaseOutputs::default());
    }

    let internal = production_load_balancer(ctx, Tier::Internal);
    let public = production_load_balancer(ctx, Tier::Public);

    let (internal_alb_dns_name, public_alb_dns_name, alb_zone_id) = tokio::try_join!(
        non_empty(provider.load_balancer_dns_name(&internal), &internal),
        non_empty(provider.load_balancer_dns_name(&public), &public),
        non_empty(provider.alb_hosted_zone_id(&ctx.region), "ALB hosted zone"),
    )?;

    tracing::info!(
        release = %outcome.id,
        status = %outcome.status,
        %internal_alb_dns_name,
        %public_alb_dns_name,
        "post-release lookups complete"
    );

    Ok(PostReleaseOutputs {
        internal_alb_dns_name,
        public_alb_dns_name,
        alb_zone_id,
    })
}

async fn non_empty(lookup: impl Future<Output = Result<String>>, resource: &str) -> Result<String> {
    let value = lookup.await?;
    if value.trim().is_empty() {
        return Err(DeployError::lookup(resource, "empty value returned"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StackName;
    use crate::provider::StaticProvider;

    fn ctx(stack: StackName) -> StackContext {
        StackContext {
            stack,
            account_id: "123456789012".to_string(),
            region: "us-east-1".to_string(),
            project: "doc-mgmt".to_string(),
        }
    }

    fn outcome() -> ReleaseOutcome {
        ReleaseOutcome {
            id: "docmgmt/doc-mgmt".to_string(),
            status: "deployed".to_string(),
            revision: "sha256:00".to_string(),
        }
    }

    fn prod_provider() -> StaticProvider {
        StaticProvider::new()
            .with_load_balancer("prod-internal-apps", "internal-prod.elb.amazonaws.com")
            .with_load_balancer("prod-public-apps", "prod-public.elb.amazonaws.com")
            .with_zone_id("us-east-1", "Z35SXDOTRQ7X7K")
    }

    #[tokio::test]
    async fn test_production_exports_looked_up_names() {
        let provider = prod_provider();
        let outputs = lookup(&ctx(StackName::Prod), &provider, &outcome())
            .await
            .unwrap();
        assert_eq!(
            outputs.internal_alb_dns_name,
            "internal-prod.elb.amazonaws.com"
        );
        assert_eq!(outputs.public_alb_dns_name, "prod-public.elb.amazonaws.com");
        assert_eq!(outputs.alb_zone_id, "Z35SXDOTRQ7X7K");
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_non_production_makes_no_calls() {
        let provider = prod_provider();
        for stack in [
            StackName::Dev,
            StackName::Staging,
            StackName::Other("preview-7".to_string()),
        ] {
            let outputs = lookup(&ctx(stack), &provider, &outcome()).await.unwrap();
            assert_eq!(outputs, PostReleaseOutputs::default());
        }
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_dns_name_is_an_error() {
        let provider = prod_provider().with_load_balancer("prod-public-apps", "");
        let err = lookup(&ctx(StackName::Prod), &provider, &outcome())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DeployError::Lookup { ref resource, .. } if resource == "prod-public-apps"
        ));
    }

    #[tokio::test]
    async fn test_missing_load_balancer_is_an_error() {
        let provider = StaticProvider::new().with_zone_id("us-east-1", "Z35SXDOTRQ7X7K");
        let err = lookup(&ctx(StackName::Prod), &provider, &outcome())
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::Lookup { .. }));
    }
}
