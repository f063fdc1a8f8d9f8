//! Permissions granted to the running service.

use super::{PolicyDocument, PolicyStatement};
use crate::core::{DeployError, Result};
use crate::references::UpstreamRefs;

/// Read-only actions on the templates bucket.
pub const TEMPLATE_READ_ACTIONS: [&str; 7] = [
    "s3:ListBucket",
    "s3:GetBucketAcl",
    "s3:GetBucketLocation",
    "s3:GetBucketPolicyStatus",
    "s3:GetBucketPublicAccessBlock",
    "s3:GetObject",
    "s3:GetObjectVersion",
];

/// Build the execution policy from resolved references.
///
/// Statements, in order:
/// 1. `AccessTable`: `dynamodb:*` on the documents, envelope-callbacks and envelopes tables
/// 2. `*` on the document bucket and its objects
/// 3. `TemplatesReadOnly`: [`TEMPLATE_READ_ACTIONS`] on the templates bucket and its objects
/// 4. `*` on every extra bucket in `s3_access_to`
///
/// # Errors
///
/// [`DeployError::InvalidConfiguration`] when `s3_access_to` is empty.
pub fn build_execution_policy(
    refs: &UpstreamRefs,
    s3_access_to: &[String],
) -> Result<PolicyDocument> {
    if s3_access_to.is_empty() {
        return Err(DeployError::invalid("s3AccessTo", "at least one bucket ARN is required"));
    }

    let statements = vec![
        PolicyStatement::allow(["dynamodb:*"])
            .with_sid("AccessTable")
            .on([
                refs.documents_arn.as_str(),
                refs.envelope_callbacks_arn.as_str(),
                refs.envelopes_arn.as_str(),
            ]),
        PolicyStatement::allow(["*"])
            .on([refs.bucket_arn.clone(), format!("{}/*", refs.bucket_arn)]),
        PolicyStatement::allow(TEMPLATE_READ_ACTIONS)
            .with_sid("TemplatesReadOnly")
            .on([
                refs.templates_bucket_arn.clone(),
                format!("{}/*", refs.templates_bucket_arn),
            ]),
        PolicyStatement::allow(["*"]).on(s3_access_to.iter().cloned()),
    ];

    tracing::debug!(statements = statements.len(), "built execution policy");
    Ok(PolicyDocument::new(statements))
}
