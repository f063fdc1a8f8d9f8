//! `policy`: print one of the IAM artifacts.

use super::common::{OutputFormat, Session, StackArgs, with_newline};
use crate::iam::{IamArtifacts, ServiceAccountIdentity, build_execution_policy, build_trust_policy};
use crate::provider::CloudProvider;
use crate::references::UpstreamRefs;
use anyhow::Result;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// Which artifact to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyKind {
    /// Permissions of the running service
    Execution,
    /// Federated trust for the service account
    Trust,
    /// Policy and role definitions, including both documents
    Role,
}

#[derive(Args, Debug)]
pub struct PolicyCommand {
    /// Artifact to print
    #[arg(long, value_enum, default_value = "execution")]
    pub kind: PolicyKind,

    /// Output format; text prints JSON documents
    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

impl PolicyCommand {
    pub async fn execute(self, manifest_path: Option<PathBuf>, args: &StackArgs) -> Result<()> {
        let session = Session::open(manifest_path, args).await?;

        let rendered = match self.kind {
            PolicyKind::Execution => {
                let store = session.references();
                let refs = UpstreamRefs::resolve(store.as_ref(), &session.stack_reference())
                    .await?;
                let document = build_execution_policy(&refs, &session.stack.s3_access_to)?;
                self.render(&document)?
            }
            PolicyKind::Trust => {
                let identity = ServiceAccountIdentity::for_stack(
                    &session.ctx.stack,
                    &session.stack.namespace,
                    session.stack.v_cluster_namespace.as_deref(),
                )?;
                let provider = session.provider().await?;
                let issuer = provider
                    .cluster_oidc_issuer(&session.stack.eks_cluster_name)
                    .await?;
                let document = build_trust_policy(&issuer, &session.ctx.account_id, &identity)?;
                self.render(&document)?
            }
            PolicyKind::Role => {
                let artifacts: IamArtifacts = session
                    .deployment(false)
                    .await?
                    .iam_artifacts()
                    .await?;
                self.render(&artifacts)?
            }
        };

        print!("{}", with_newline(rendered));
        Ok(())
    }

    fn render<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        match self.format {
            OutputFormat::Text => OutputFormat::Json.render(value),
            format => format.render(value),
        }
    }
}
