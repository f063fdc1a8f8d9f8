//! `validate`: fail-fast checks of everything a run needs.
//!
//! Checks run in order and stop at the first failure:
//!
//! 1. `manifest` - `deploy.toml` is found and parses
//! 2. `context` - stack, account, region and project resolve and are
//!    well-formed, and the stack table has every required key
//! 3. `identity` - the service-account identity can be derived
//! 4. `secrets` - every chart secret is present and non-empty
//! 5. `image tag` - set, or only a warning unless `--require-image-tag`
//!
//! With `--references`, the upstream stack outputs and the cluster OIDC issuer
//! are resolved as well.
//!
//! # Output
//!
//! ```text
//! ✓ manifest: /work/deploy/deploy.toml
//! ✓ context: dev in 123456789012/us-east-1
//! ✗ secrets: Required configuration 'AUTH__API_KEYS' is not set
//! ```
//!
//! `--format json` prints the same report as a JSON object.

use super::common::{OutputFormat, Session, StackArgs};
use crate::config::{Manifest, find_manifest_with_optional};
use crate::core::DeployError;
use crate::iam::{ServiceAccountIdentity, issuer_host};
use crate::provider::CloudProvider;
use crate::references::UpstreamRefs;
use crate::secrets::SecretBundle;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Also resolve upstream stack outputs and the cluster OIDC issuer
    #[arg(long)]
    pub references: bool,

    /// Treat a missing image tag as an error
    #[arg(long)]
    pub require_image_tag: bool,

    /// Output format (text or json)
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Result of one check.
#[derive(Debug, Clone, Serialize)]
pub struct Check {
    pub name: &'static str,
    pub ok: bool,
    pub detail: String,
}

/// Everything `validate` found, in check order.
#[derive(Debug, Default, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub stack: Option<String>,
    pub checks: Vec<Check>,
    pub warnings: Vec<String>,
    #[serde(skip)]
    current: &'static str,
}

impl ValidationReport {
    fn check(&mut self, name: &'static str) {
        self.current = name;
    }

    fn pass(&mut self, detail: impl Into<String>) {
        self.checks.push(Check {
            name: self.current,
            ok: true,
            detail: detail.into(),
        });
    }

    fn fail(&mut self, error: &anyhow::Error) {
        self.checks.push(Check {
            name: self.current,
            ok: false,
            detail: error.to_string(),
        });
    }

    fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}

impl ValidateCommand {
    pub async fn execute(self, manifest_path: Option<PathBuf>, args: &StackArgs) -> Result<()> {
        let mut report = ValidationReport::default();
        let outcome = self.run_checks(manifest_path, args, &mut report).await;
        match &outcome {
            Ok(()) => report.valid = true,
            Err(e) => report.fail(e),
        }
        self.print(&report)?;
        outcome
    }

    async fn run_checks(
        &self,
        manifest_path: Option<PathBuf>,
        args: &StackArgs,
        report: &mut ValidationReport,
    ) -> Result<()> {
        report.check("manifest");
        let path = find_manifest_with_optional(manifest_path)?;
        let manifest = Manifest::load(&path).await?;
        report.pass(path.display().to_string());

        report.check("context");
        let root = path.parent().map(PathBuf::from).unwrap_or_default();
        let session = Session::from_manifest(manifest, root, args)?;
        report.stack = Some(session.ctx.stack.to_string());
        report.pass(format!(
            "{} in {}/{}",
            session.ctx.stack, session.ctx.account_id, session.ctx.region
        ));

        report.check("identity");
        let identity = ServiceAccountIdentity::for_stack(
            &session.ctx.stack,
            &session.stack.namespace,
            session.stack.v_cluster_namespace.as_deref(),
        )?;
        report.pass(identity.to_string());

        report.check("secrets");
        let secrets = SecretBundle::fetch(session.secrets().as_ref()).await?;
        report.pass(format!("{} present", secrets.keys().count()));

        report.check("image tag");
        let tag = args.image_tag.as_deref().map(str::trim);
        match tag.filter(|t| !t.is_empty()) {
            Some(tag) => report.pass(tag),
            None if self.require_image_tag => {
                return Err(DeployError::missing("IMAGE_TAG", "--image-tag or IMAGE_TAG").into());
            }
            None => report.warn("IMAGE_TAG is not set; APP_VERSION will be empty"),
        }

        if self.references {
            report.check("references");
            let reference = session.stack_reference();
            UpstreamRefs::resolve(session.references().as_ref(), &reference)
                .await?;
            report.pass(format!("all outputs of {reference}"));

            report.check("cluster issuer");
            let provider = session.provider().await?;
            let issuer = provider
                .cluster_oidc_issuer(&session.stack.eks_cluster_name)
                .await?;
            report.pass(issuer_host(&issuer)?);
        }

        Ok(())
    }

    fn print(&self, report: &ValidationReport) -> Result<()> {
        if self.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(report)?);
            return Ok(());
        }

        for check in &report.checks {
            let mark = if check.ok { "✓".green() } else { "✗".red() };
            println!("{mark} {}: {}", check.name, check.detail);
        }
        for warning in &report.warnings {
            println!("{} {warning}", "⚠".yellow());
        }
        if report.valid {
            let stack = report.stack.as_deref().unwrap_or_default();
            println!("{}", format!("Stack '{stack}' is valid").green().bold());
        }
        Ok(())
    }
}
