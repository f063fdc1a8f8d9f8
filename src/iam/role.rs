//! The execution policy and role as IAM resources.

use super::{PolicyDocument, ServiceAccountIdentity, build_execution_policy, build_trust_policy};
use crate::config::ResolvedStackConfig;
use crate::constants::MANAGED_POLICY_ARNS;
use crate::context::StackContext;
use crate::core::Result;
use crate::references::UpstreamRefs;
use serde::Serialize;
use std::collections::BTreeMap;

/// Customer-managed policy holding the execution permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPolicySpec {
    /// Policy name
    pub name: String,
    /// IAM path
    pub path: String,
    /// Human-readable description
    pub description: String,
    /// Permissions granted to the pod
    pub document: PolicyDocument,
    /// Resource tags
    pub tags: BTreeMap<String, String>,
    /// ARN the policy will have once created
    pub arn: String,
}

/// Role assumed by the service account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRoleSpec {
    /// Role name
    pub name: String,
    /// Trust policy for the service account
    pub assume_role_policy: PolicyDocument,
    /// AWS-managed policies followed by the execution policy
    pub managed_policy_arns: Vec<String>,
    /// Resource tags
    pub tags: BTreeMap<String, String>,
    /// ARN the role will have once created
    pub arn: String,
}

/// Everything IAM needs for one stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IamArtifacts {
    /// Service-account `sub` claim the role trusts
    pub identity: String,
    /// Execution policy
    pub policy: ExecutionPolicySpec,
    /// Execution role
    pub role: ExecutionRoleSpec,
}

impl IamArtifacts {
    /// Build the policy, then the role that attaches it.
    ///
    /// # Errors
    ///
    /// Propagates identity, execution-policy and trust-policy failures.
    pub fn build(
        ctx: &StackContext,
        stack: &ResolvedStackConfig,
        refs: &UpstreamRefs,
        issuer_url: &str,
    ) -> Result<Self> {
        let identity = ServiceAccountIdentity::for_stack(
            &ctx.stack,
            &stack.namespace,
            stack.v_cluster_namespace.as_deref(),
        )?;

        let policy_name = format!("{}-{}-pod-execution-policy", ctx.stack, ctx.project);
        let policy = ExecutionPolicySpec {
            arn: format!("arn:aws:iam::{}:policy/{policy_name}", ctx.account_id),
            path: "/".to_string(),
            description: policy_name.clone(),
            document: build_execution_policy(refs, &stack.s3_access_to)?,
            tags: ctx.resource_tags(),
            name: policy_name,
        };

        let role_name = format!("{}-{}-eks-pod-execution-role", ctx.stack, ctx.project);
        let managed_policy_arns = MANAGED_POLICY_ARNS
            .iter()
            .map(|arn| (*arn).to_string())
            .chain(std::iter::once(policy.arn.clone()))
            .collect();
        let role = ExecutionRoleSpec {
            arn: format!("arn:aws:iam::{}:role/{role_name}", ctx.account_id),
            assume_role_policy: build_trust_policy(issuer_url, &ctx.account_id, &identity)?,
            managed_policy_arns,
            tags: ctx.resource_tags(),
            name: role_name,
        };

        tracing::info!(role = %role.name, policy = %policy.name, "built IAM artifacts");

        Ok(Self {
            identity: identity.to_string(),
            policy,
            role,
        })
    }
}
