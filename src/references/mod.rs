//! Cross-stack references.
//!
//! Infra stacks publish named outputs (table ARNs, bucket ARNs, the webhook
//! certificate, the ALB security group). This module fetches them from a
//! [`ReferenceStore`] and joins them into a fully-resolved [`UpstreamRefs`]
//! before anything that depends on them is built.
//!
//! # Join barrier
//!
//! [`UpstreamRefs::resolve`] requests every key concurrently and only returns
//! once all of them are known. If any key is missing the whole resolution
//! fails; there is no partially-resolved value to leak into a descriptor.
//!
//! ```rust,no_run
//! use doc_mgmt_deploy::references::{MemoryReferenceStore, StackReference, UpstreamRefs};
//!
//! # async fn example() -> doc_mgmt_deploy::core::Result<()> {
//! let reference = StackReference::new("acme", "doc-mgmt", "dev");
//! let store = MemoryReferenceStore::new();
//! let refs = UpstreamRefs::resolve(&store, &reference).await?;
//! println!("bucket: {}", refs.bucket_arn);
//! # Ok(())
//! # }
//! ```

mod file;
mod memory;

pub use file::FileReferenceStore;
pub use memory::MemoryReferenceStore;

use crate::core::Result;
use futures::future::BoxFuture;
use serde::Serialize;
use std::fmt;

/// Output keys published by the infra stack.
pub mod keys {
    /// Security group attached to the public ALB
    pub const SECURITY_GROUP_ID: &str = "securityGroupId";
    /// Documents table
    pub const DOCUMENTS_ARN: &str = "DocumentsArn";
    /// Envelope callbacks table
    pub const ENVELOPE_CALLBACKS_ARN: &str = "EnvelopeCallbacksArn";
    /// Envelopes table
    pub const ENVELOPES_ARN: &str = "EnvelopesArn";
    /// Document storage bucket
    pub const BUCKET_ARN: &str = "bucketArn";
    /// Template bucket (read-only for the service)
    pub const TEMPLATES_BUCKET_ARN: &str = "templatesBucketArn";
    /// Certificate for the ALB listeners
    pub const CERT_ARN_WEBHOOK: &str = "certArnWebHook";

    /// Every key, in the order they are requested.
    pub const ALL: [&str; 7] = [
        SECURITY_GROUP_ID,
        DOCUMENTS_ARN,
        ENVELOPE_CALLBACKS_ARN,
        ENVELOPES_ARN,
        BUCKET_ARN,
        TEMPLATES_BUCKET_ARN,
        CERT_ARN_WEBHOOK,
    ];
}

/// Address of an infra stack, `org/<project>-infra/<stack>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StackReference {
    org: String,
    project: String,
    stack: String,
}

impl StackReference {
    /// Reference the infra stack paired with `project` at `stack`.
    pub fn new(
        org: impl Into<String>,
        project: impl Into<String>,
        stack: impl Into<String>,
    ) -> Self {
        Self {
            org: org.into(),
            project: project.into(),
            stack: stack.into(),
        }
    }

    /// Owning organization.
    #[must_use]
    pub fn org(&self) -> &str {
        &self.org
    }

    /// Infra project name, `<project>-infra`.
    #[must_use]
    pub fn infra_project(&self) -> String {
        format!("{}-infra", self.project)
    }

    /// Stack name within the infra project.
    #[must_use]
    pub fn stack(&self) -> &str {
        &self.stack
    }

    /// Full path used in error messages and as the store key.
    #[must_use]
    pub fn path(&self) -> String {
        format!("{}/{}/{}", self.org, self.infra_project(), self.stack)
    }

    /// Request a single output. Nothing happens until the future is awaited.
    pub fn output<'a>(
        &'a self,
        store: &'a dyn ReferenceStore,
        key: &'a str,
    ) -> BoxFuture<'a, Result<String>> {
        store.get_output(self, key)
    }
}

impl fmt::Display for StackReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Source of cross-stack outputs.
///
/// Implementations decide how (and whether) to cache. A key or stack that does
/// not exist must be reported as [`crate::core::DeployError::ReferenceNotFound`].
pub trait ReferenceStore: Send + Sync {
    /// Fetch `key` from `stack`.
    fn get_output<'a>(
        &'a self,
        stack: &'a StackReference,
        key: &'a str,
    ) -> BoxFuture<'a, Result<String>>;
}

/// Every upstream value a deployment run needs, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamRefs {
    /// `securityGroupId`
    pub security_group_id: String,
    /// `DocumentsArn`
    pub documents_arn: String,
    /// `EnvelopeCallbacksArn`
    pub envelope_callbacks_arn: String,
    /// `EnvelopesArn`
    pub envelopes_arn: String,
    /// `bucketArn`
    pub bucket_arn: String,
    /// `templatesBucketArn`
    pub templates_bucket_arn: String,
    /// `certArnWebHook`
    pub cert_arn_web_hook: String,
}

impl UpstreamRefs {
    /// Fetch every key concurrently and wait for all of them.
    ///
    /// # Errors
    ///
    /// The first failure among the keys; the remaining requests are dropped.
    pub async fn resolve(store: &dyn ReferenceStore, reference: &StackReference) -> Result<Self> {
        tracing::debug!(stack = %reference, "resolving upstream references");

        let (
            security_group_id,
            documents_arn,
            envelope_callbacks_arn,
            envelopes_arn,
            bucket_arn,
            templates_bucket_arn,
            cert_arn_web_hook,
        ) = tokio::try_join!(
            reference.output(store, keys::SECURITY_GROUP_ID),
            reference.output(store, keys::DOCUMENTS_ARN),
            reference.output(store, keys::ENVELOPE_CALLBACKS_ARN),
            reference.output(store, keys::ENVELOPES_ARN),
            reference.output(store, keys::BUCKET_ARN),
            reference.output(store, keys::TEMPLATES_BUCKET_ARN),
            reference.output(store, keys::CERT_ARN_WEBHOOK),
        )?;

        tracing::debug!(stack = %reference, "all upstream references resolved");

        Ok(Self {
            security_group_id,
            documents_arn,
            envelope_callbacks_arn,
            envelopes_arn,
            bucket_arn,
            templates_bucket_arn,
            cert_arn_web_hook,
        })
    }
}
