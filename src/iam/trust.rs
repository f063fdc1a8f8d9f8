//! Federated trust between the pod execution role and a Kubernetes service account.

use super::{ConditionOperator, PolicyDocument, PolicyStatement, TrustCondition};
use crate::context::StackName;
use crate::core::{DeployError, Result};
use std::fmt;
use url::Url;

/// The `sub` claim a service-account token carries.
///
/// In production the service account lives directly in the host cluster.
/// Other stacks run inside a virtual cluster, whose syncer renames the
/// service account as `<name>-x-<namespace>-x-<vcluster namespace>` in the
/// host namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceAccountIdentity(String);

impl ServiceAccountIdentity {
    /// Identity for `namespace` on `stack`.
    ///
    /// # Errors
    ///
    /// [`DeployError::ConfigurationMissing`] for a non-production stack without
    /// a virtual cluster namespace.
    pub fn for_stack(
        stack: &StackName,
        namespace: &str,
        vcluster_namespace: Option<&str>,
    ) -> Result<Self> {
        let account = format!("{namespace}-sa");
        if stack.is_production() {
            return Ok(Self(format!("system:serviceaccount:{namespace}:{account}")));
        }

        let vcluster = vcluster_namespace
            .filter(|v| !v.is_empty())
            .ok_or_else(|| DeployError::missing("vClusterNamespace", format!("[stacks.{stack}]")))?;
        Ok(Self(format!(
            "system:serviceaccount:{vcluster}:{account}-x-{namespace}-x-{vcluster}"
        )))
    }

    /// The claim value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceAccountIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Host and path of an OIDC issuer, as IAM spells it.
///
/// The `https://` prefix and any trailing `/` are removed; the rest is kept literally.
///
/// # Errors
///
/// [`DeployError::InvalidIssuerUrl`] unless `issuer_url` is an `https://` URL
/// with a host, no credentials, and no query or fragment.
pub fn issuer_host(issuer_url: &str) -> Result<String> {
    const PREFIX: &str = "https://";

    let raw = issuer_url.trim();
    let invalid = |reason: &str| DeployError::InvalidIssuerUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let parsed = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
    if parsed.scheme() != "https" {
        return Err(invalid("scheme must be https"));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host"));
    }
    if !parsed.username().is_empty() || parsed.password().is_some() {
        return Err(invalid("credentials are not allowed"));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed"));
    }

    // The parser tolerates `https:host` and `https:/host`; IAM needs the literal form.
    let rest = raw
        .get(..PREFIX.len())
        .filter(|scheme| scheme.eq_ignore_ascii_case(PREFIX))
        .and_then(|_| raw.get(PREFIX.len()..))
        .ok_or_else(|| invalid("must start with https://"))?;
    let host = rest.trim_end_matches('/');
    if host.is_empty() || host.starts_with('/') {
        return Err(invalid("missing host"));
    }
    Ok(host.to_string())
}

/// Trust policy letting `identity` assume the role through the cluster's OIDC provider.
///
/// # Errors
///
/// [`DeployError::InvalidIssuerUrl`] if `issuer_url` is not usable.
pub fn build_trust_policy(
    issuer_url: &str,
    account_id: &str,
    identity: &ServiceAccountIdentity,
) -> Result<PolicyDocument> {
    let host = issuer_host(issuer_url)?;
    let statement = PolicyStatement::allow(["sts:AssumeRoleWithWebIdentity"])
        .with_principal(
            "Federated",
            format!("arn:aws:iam::{account_id}:oidc-provider/{host}"),
        )
        .with_condition(TrustCondition {
            test: ConditionOperator::StringEquals,
            variable: format!("{host}:sub"),
            values: vec![identity.to_string()],
        });

    tracing::debug!(issuer = %host, %identity, "built trust policy");
    Ok(PolicyDocument::new(vec![statement]))
}
