//! Command-line interface for doc-mgmt-deploy.
//!
//! Every command operates on one stack, selected with `--stack` (or
//! `DEPLOY_STACK`), of the project described by the nearest `deploy.toml`.
//!
//! # Commands
//!
//! - `identity` - print the Kubernetes service-account identity
//! - `annotations` - print the load balancer annotation sets
//! - `policy` - print the execution policy, trust policy or role definition
//! - `render` - assemble the release descriptor
//! - `deploy` - run the full pipeline with the render engine and print exported values
//! - `validate` - check configuration, secrets and (optionally) upstream references
//!
//! # Examples
//!
//! ```bash
//! doc-mgmt-deploy --stack dev identity
//! doc-mgmt-deploy --stack prod annotations --tier public --format json
//! DEPLOY_STACK=staging IMAGE_TAG=1.4.2 doc-mgmt-deploy render --output release.yaml
//! doc-mgmt-deploy --stack prod deploy
//! ```
//!
//! Logs go to stderr; stdout only carries command output so it can be piped.

mod annotations;
pub mod common;
mod deploy;
mod identity;
mod policy;
mod render;
pub mod validate;


use anyhow::Result;
use clap::{Parser, Subcommand};
use common::StackArgs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Runtime settings derived from global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log level for this crate; `None` keeps only errors
    pub log_level: Option<String>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the stderr subscriber. `RUST_LOG` wins over the flags.
    pub fn init_logging(&self) {
        let level = self.log_level.as_deref().unwrap_or("error");
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("warn,doc_mgmt_deploy={level}")));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

#[derive(Parser)]
#[command(
    name = "doc-mgmt-deploy",
    about = "Derive per-stack deployment configuration for the document management service",
    version,
    long_about = "Builds load balancer annotations, IAM policies and the Helm release \
                  descriptor for one stack from deploy.toml, exported infra stack outputs, \
                  secrets and a cloud inventory."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to deploy.toml (default: search upward from the current directory)
    #[arg(long, global = true)]
    manifest_path: Option<PathBuf>,

    #[command(flatten)]
    stack: StackArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the service-account identity the role trusts
    Identity(identity::IdentityCommand),

    /// Print the load balancer annotation sets
    Annotations(annotations::AnnotationsCommand),

    /// Print IAM documents
    Policy(policy::PolicyCommand),

    /// Assemble the release descriptor
    Render(render::RenderCommand),

    /// Render the release, then print the exported stack values
    Deploy(deploy::DeployCommand),

    /// Check configuration and inputs without building anything
    Validate(validate::ValidateCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };

        CliConfig { log_level }
    }

    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        let manifest_path = self.manifest_path;
        let stack = self.stack;
        match self.command {
            Commands::Identity(cmd) => cmd.execute(manifest_path, &stack).await,
            Commands::Annotations(cmd) => cmd.execute(manifest_path, &stack).await,
            Commands::Policy(cmd) => cmd.execute(manifest_path, &stack).await,
            Commands::Render(cmd) => cmd.execute(manifest_path, &stack).await,
            Commands::Deploy(cmd) => cmd.execute(manifest_path, &stack).await,
            Commands::Validate(cmd) => cmd.execute(manifest_path, &stack).await,
        }
    }
}
