//! `render`: assemble the release descriptor without applying it.

use super::common::{OutputFormat, Session, StackArgs, with_newline};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Write the descriptor here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (text is YAML)
    #[arg(long, value_enum, default_value = "yaml")]
    pub format: OutputFormat,

    /// Include secret values instead of placeholders
    #[arg(long)]
    pub show_secrets: bool,

    /// Fail when no image tag is set
    #[arg(long)]
    pub require_image_tag: bool,
}

impl RenderCommand {
    pub async fn execute(self, manifest_path: Option<PathBuf>, args: &StackArgs) -> Result<()> {
        let session = Session::open(manifest_path, args).await?;
        let deployment = session.deployment(self.require_image_tag).await?;
        let prepared = deployment.prepare().await?;

        let descriptor = if self.show_secrets {
            prepared.descriptor.clone()
        } else {
            prepared.descriptor.redacted()
        };
        let rendered = with_newline(self.format.render(&descriptor)?);
        let digest = prepared.descriptor.digest()?;

        match self.output {
            Some(path) => {
                tokio::fs::write(&path, rendered)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!(
                    "{} Rendered {} ({})",
                    "✓".green(),
                    path.display(),
                    digest.dimmed()
                );
            }
            None => {
                tracing::info!(%digest, "rendered release descriptor");
                print!("{rendered}");
            }
        }
        Ok(())
    }
}
