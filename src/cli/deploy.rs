//! `deploy`: run the whole pipeline against the render engine.

use super::common::{Session, StackArgs, with_newline};
use crate::constants::DEFAULT_RENDER_DIR;
use crate::release::RenderEngine;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct DeployCommand {
    /// Directory the release descriptor is written to, relative to the manifest
    #[arg(long, default_value = DEFAULT_RENDER_DIR)]
    pub out_dir: PathBuf,

    /// Write placeholders instead of secret values
    #[arg(long)]
    pub redact_secrets: bool,

    /// Fail when no image tag is set
    #[arg(long)]
    pub require_image_tag: bool,
}

impl DeployCommand {
    pub async fn execute(self, manifest_path: Option<PathBuf>, args: &StackArgs) -> Result<()> {
        let session = Session::open(manifest_path, args).await?;
        let deployment = session.deployment(self.require_image_tag).await?;
        let engine = RenderEngine::new(session.root.join(&self.out_dir), session.ctx.stack.clone())
            .redacting(self.redact_secrets);

        let outputs = deployment
            .run(&engine)
            .await
            .with_context(|| format!("Deployment of stack '{}' failed", session.ctx.stack))?;

        print!("{}", with_newline(serde_json::to_string_pretty(&outputs)?));
        Ok(())
    }
}
