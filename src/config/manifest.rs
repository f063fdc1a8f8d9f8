//! The `deploy.toml` project manifest.
//!
//! The manifest holds the project-wide settings and one table per stack:
//!
//! ```toml
//! [project]
//! name = "doc-mgmt"
//!
//! [stacks.dev]
//! namespace = "docmgmt"
//! org = "acme"
//! eksClusterName = "shared-eks"
//! s3AccessTo = ["arn:aws:s3:::shared-exports"]
//! vClusterNamespace = "team-a"
//! ```
//!
//! Key names match the stack configuration keys used by the infra tooling, so
//! they are camelCase rather than the kebab-case usual for TOML.

use crate::constants::{DEFAULT_CHART_PATH, DEFAULT_DNS_ZONE, MANIFEST_FILE};
use crate::context::StackName;
use crate::core::{DeployError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Parsed `deploy.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Project-wide settings
    pub project: ProjectSettings,

    /// Per-stack configuration keyed by stack name
    #[serde(default)]
    pub stacks: BTreeMap<String, StackConfig>,
}

/// The `[project]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    /// Project name; also the Helm release name
    pub name: String,

    /// Chart location handed to the release engine
    #[serde(default = "default_chart")]
    pub chart: String,

    /// Directory holding `<stack>-values.yaml` overlays. Defaults to the chart path.
    #[serde(default)]
    pub values_dir: Option<String>,

    /// Zone for predictable non-production hostnames
    #[serde(default = "default_dns_zone")]
    pub dns_zone: String,

    /// Host label used in non-production hostnames. Defaults to the project name.
    #[serde(default)]
    pub dns_label: Option<String>,
}

fn default_chart() -> String {
    DEFAULT_CHART_PATH.to_string()
}

fn default_dns_zone() -> String {
    DEFAULT_DNS_ZONE.to_string()
}

impl ProjectSettings {
    /// Directory containing per-stack values overlays.
    #[must_use]
    pub fn values_dir(&self) -> &str {
        self.values_dir.as_deref().unwrap_or(&self.chart)
    }

    /// Host label for non-production hostnames.
    #[must_use]
    pub fn dns_label(&self) -> &str {
        self.dns_label.as_deref().unwrap_or(&self.name)
    }
}

/// One `[stacks.<name>]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackConfig {
    /// Kubernetes namespace the release is installed into
    #[serde(default)]
    pub namespace: Option<String>,

    /// Organization owning the infra stacks
    #[serde(default)]
    pub org: Option<String>,

    /// EKS cluster whose OIDC issuer is trusted
    #[serde(default)]
    pub eks_cluster_name: Option<String>,

    /// Extra resources the pod may fully access
    #[serde(default)]
    pub s3_access_to: Option<Vec<String>>,

    /// Host namespace of the virtual cluster (non-production only)
    #[serde(default)]
    pub v_cluster_namespace: Option<String>,

    /// Fallback account id when neither flag nor env var is given
    #[serde(default)]
    pub account_id: Option<String>,

    /// Fallback region when neither flag nor env var is given
    #[serde(default)]
    pub region: Option<String>,
}

/// Stack configuration with every required key present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStackConfig {
    /// Kubernetes namespace
    pub namespace: String,
    /// Organization owning the infra stacks
    pub org: String,
    /// EKS cluster name
    pub eks_cluster_name: String,
    /// Extra resource ARNs, never empty
    pub s3_access_to: Vec<String>,
    /// `Some` exactly when the stack is not production
    pub v_cluster_namespace: Option<String>,
}

impl StackConfig {
    /// Check required keys for `stack` and return the resolved form.
    ///
    /// `vClusterNamespace` is required only outside production and ignored in it.
    ///
    /// # Errors
    ///
    /// [`DeployError::ConfigurationMissing`] for the first absent key, or
    /// [`DeployError::InvalidConfiguration`] when `s3AccessTo` is empty.
    pub fn resolve(&self, stack: &StackName) -> Result<ResolvedStackConfig> {
        let origin = format!("deploy.toml [stacks.{stack}]");
        let take = |value: &Option<String>, key: &str| -> Result<String> {
            match value {
                Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
                _ => Err(DeployError::missing(key, origin.clone())),
            }
        };

        let namespace = take(&self.namespace, "namespace")?;
        let org = take(&self.org, "org")?;
        let eks_cluster_name = take(&self.eks_cluster_name, "eksClusterName")?;
        let s3_access_to = self
            .s3_access_to
            .clone()
            .ok_or_else(|| DeployError::missing("s3AccessTo", origin.clone()))?;
        if s3_access_to.is_empty() || s3_access_to.iter().any(|arn| arn.trim().is_empty()) {
            return Err(DeployError::invalid(
                "s3AccessTo",
                "must list at least one resource ARN and contain no empty entries",
            ));
        }

        let v_cluster_namespace = if stack.is_production() {
            None
        } else {
            Some(take(&self.v_cluster_namespace, "vClusterNamespace")?)
        };

        Ok(ResolvedStackConfig {
            namespace,
            org,
            eks_cluster_name,
            s3_access_to,
            v_cluster_namespace,
        })
    }
}

impl Manifest {
    /// Parse a manifest from TOML text. `file` is only used in error messages.
    ///
    /// # Errors
    ///
    /// [`DeployError::ManifestParse`] on invalid TOML or unknown shapes.
    pub fn from_toml(content: &str, file: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| DeployError::ManifestParse {
            file: file.to_string(),
            reason: e.to_string(),
        })
    }

    /// Load a manifest from `path`.
    ///
    /// # Errors
    ///
    /// IO errors reading the file, or [`DeployError::ManifestParse`].
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let manifest = Self::from_toml(&content, &path.display().to_string())?;
        tracing::debug!(
            path = %path.display(),
            stacks = manifest.stacks.len(),
            "loaded manifest"
        );
        Ok(manifest)
    }

    /// Configuration table for `stack`.
    ///
    /// # Errors
    ///
    /// [`DeployError::ConfigurationMissing`] when the manifest has no such table.
    pub fn stack(&self, stack: &StackName) -> Result<&StackConfig> {
        self.stacks
            .get(stack.as_str())
            .ok_or_else(|| DeployError::missing(format!("stacks.{stack}"), "deploy.toml"))
    }
}

/// Locate `deploy.toml`, preferring an explicit path.
///
/// # Errors
///
/// [`DeployError::ManifestNotFound`] when the explicit path does not exist or
/// the upward search reaches the filesystem root.
pub fn find_manifest_with_optional(explicit_path: Option<PathBuf>) -> Result<PathBuf> {
    match explicit_path {
        Some(path) if path.exists() => Ok(path),
        Some(path) => Err(DeployError::ManifestNotFound {
            searched: path.display().to_string(),
        }),
        None => find_manifest_from(std::env::current_dir()?),
    }
}

/// Walk up from `current` until a `deploy.toml` is found.
///
/// # Errors
///
/// [`DeployError::ManifestNotFound`] if no ancestor contains a manifest.
pub fn find_manifest_from(start: PathBuf) -> Result<PathBuf> {
    let mut current = start.clone();
    loop {
        let candidate = current.join(MANIFEST_FILE);
        if candidate.exists() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(DeployError::ManifestNotFound {
                searched: start.display().to_string(),
            });
        }
    }
}
