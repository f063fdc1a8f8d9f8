//! `identity`: print the service-account `sub` claim for the stack.

use super::common::{Session, StackArgs};
use crate::iam::ServiceAccountIdentity;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct IdentityCommand {}

impl IdentityCommand {
    pub async fn execute(self, manifest_path: Option<PathBuf>, args: &StackArgs) -> Result<()> {
        let session = Session::open(manifest_path, args).await?;
        let identity = ServiceAccountIdentity::for_stack(
            &session.ctx.stack,
            &session.stack.namespace,
            session.stack.v_cluster_namespace.as_deref(),
        )?;
        println!("{identity}");
        Ok(())
    }
}
