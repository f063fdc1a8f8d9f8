//! Shared plumbing for the stack-scoped commands.
//!
//! Every command works on one stack of one project. [`StackArgs`] collects the
//! inputs that select and describe it (flags with environment fallbacks), and
//! [`Session`] turns them plus `deploy.toml` into a validated context and the
//! file-backed collaborators.

use crate::config::{Manifest, ProjectSettings, ResolvedStackConfig, find_manifest_with_optional};
use crate::constants::{DEFAULT_INVENTORY_FILE, DEFAULT_REFERENCES_DIR};
use crate::context::{ContextInputs, StackContext, StackName};
use crate::deployment::Deployment;
use crate::provider::FileInventory;
use crate::references::{FileReferenceStore, StackReference};
use crate::secrets::EnvSecrets;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Output format for printable artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}

impl OutputFormat {
    /// Render `value` as JSON or YAML. Text falls back to YAML.
    pub fn render<T: Serialize>(self, value: &T) -> Result<String> {
        match self {
            Self::Json => serde_json::to_string_pretty(value).context("Failed to render JSON"),
            Self::Text | Self::Yaml => {
                serde_yaml::to_string(value).context("Failed to render YAML")
            }
        }
    }
}

/// `rendered`, ending in a newline.
pub fn with_newline(mut rendered: String) -> String {
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    rendered
}

/// Stack selection and environment inputs, shared by all commands.
#[derive(Args, Debug, Clone)]
pub struct StackArgs {
    /// Stack to operate on (dev, staging, prod, ...)
    #[arg(long, global = true, env = "DEPLOY_STACK")]
    pub stack: Option<String>,

    /// AWS account id; falls back to the stack table
    #[arg(long, global = true, env = "AWS_ACCOUNT_ID")]
    pub account_id: Option<String>,

    /// AWS region; falls back to the stack table
    #[arg(long, global = true, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Directory of exported infra stack outputs, relative to the manifest
    #[arg(
        long,
        global = true,
        env = "DEPLOY_REFERENCES_DIR",
        default_value = DEFAULT_REFERENCES_DIR
    )]
    pub references_dir: PathBuf,

    /// Cloud inventory snapshot, relative to the manifest
    #[arg(
        long,
        global = true,
        env = "DEPLOY_INVENTORY",
        default_value = DEFAULT_INVENTORY_FILE
    )]
    pub inventory: PathBuf,

    /// Prefix prepended to secret environment variable names
    #[arg(long, global = true, env = "DEPLOY_SECRETS_PREFIX", default_value = "")]
    pub secrets_prefix: String,

    /// Image tag to deploy
    #[arg(long, global = true, env = "IMAGE_TAG")]
    pub image_tag: Option<String>,
}

/// A project manifest plus the validated inputs for one stack.
#[derive(Debug)]
pub struct Session {
    pub ctx: StackContext,
    pub project: ProjectSettings,
    pub stack: ResolvedStackConfig,
    /// Directory containing `deploy.toml`
    pub root: PathBuf,
    args: StackArgs,
}

impl Session {
    /// Locate and load the manifest, then resolve the stack context and config.
    pub async fn open(manifest_path: Option<PathBuf>, args: &StackArgs) -> Result<Self> {
        let manifest_path = find_manifest_with_optional(manifest_path)?;
        let manifest = Manifest::load(&manifest_path)
            .await
            .with_context(|| format!("Failed to load manifest {}", manifest_path.display()))?;
        let root = manifest_path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Self::from_manifest(manifest, root, args)
    }

    /// Resolve against an already-loaded manifest.
    pub fn from_manifest(manifest: Manifest, root: PathBuf, args: &StackArgs) -> Result<Self> {
        let stack: StackName = args.stack.as_deref().unwrap_or_default().parse()?;
        let table = manifest.stack(&stack)?;

        let ctx = StackContext::resolve(ContextInputs {
            stack: Some(stack.to_string()),
            account_id: args
                .account_id
                .clone()
                .or_else(|| table.account_id.clone()),
            region: args.region.clone().or_else(|| table.region.clone()),
            project: Some(manifest.project.name.clone()),
        })?;
        let config = table.resolve(&stack)?;

        Ok(Self {
            ctx,
            project: manifest.project,
            stack: config,
            root,
            args: args.clone(),
        })
    }

    /// The infra stack whose outputs this session reads.
    pub fn stack_reference(&self) -> StackReference {
        StackReference::new(&self.stack.org, &self.ctx.project, self.ctx.stack.as_str())
    }

    /// Store reading `<references dir>/<org>/<project>-infra/<stack>.json`.
    pub fn references(&self) -> Arc<FileReferenceStore> {
        Arc::new(FileReferenceStore::new(self.root.join(&self.args.references_dir)))
    }

    /// Secrets from the (optionally prefixed) environment.
    pub fn secrets(&self) -> Arc<EnvSecrets> {
        Arc::new(EnvSecrets::with_prefix(self.args.secrets_prefix.clone()))
    }

    /// Cloud inventory snapshot.
    pub async fn provider(&self) -> Result<Arc<FileInventory>> {
        let path = self.root.join(&self.args.inventory);
        Ok(Arc::new(FileInventory::load(&path).await?))
    }

    /// A full deployment over the file-backed collaborators.
    pub async fn deployment(&self, require_image_tag: bool) -> Result<Deployment> {
        let provider = self.provider().await?;
        Ok(Deployment::new(
            self.ctx.clone(),
            self.project.clone(),
            self.stack.clone(),
            self.references(),
            self.secrets(),
            provider,
        )
        .with_image_tag(self.args.image_tag.clone())
        .require_image_tag(require_image_tag))
    }
}
