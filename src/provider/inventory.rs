//! Cloud inventory snapshot backed by a YAML file.

use super::{CloudProvider, builtin_alb_hosted_zone_id};
use crate::core::{DeployError, Result};
use futures::future::BoxFuture;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Inventory snapshot:
///
/// ```yaml
/// clusters:
///   shared-eks:
///     oidcIssuer: https://oidc.eks.us-east-1.amazonaws.com/id/ABC123
/// loadBalancers:
///   prod-internal-apps:
///     dnsName: internal-prod-internal-apps-1.us-east-1.elb.amazonaws.com
/// albHostedZoneIds:
///   us-east-1: Z35SXDOTRQ7X7K
/// ```
///
/// `albHostedZoneIds` is optional and overrides the built-in table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInventory {
    #[serde(default)]
    clusters: BTreeMap<String, ClusterEntry>,
    #[serde(default)]
    load_balancers: BTreeMap<String, LoadBalancerEntry>,
    #[serde(default)]
    alb_hosted_zone_ids: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClusterEntry {
    oidc_issuer: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadBalancerEntry {
    dns_name: String,
}

impl FileInventory {
    /// Parse an inventory from YAML text.
    ///
    /// # Errors
    ///
    /// [`DeployError::InvalidConfiguration`] when the YAML does not match the layout.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| DeployError::invalid("inventory", e.to_string()))
    }

    /// Load the inventory at `path`.
    ///
    /// # Errors
    ///
    /// [`DeployError::Lookup`] if the file does not exist, IO errors otherwise,
    /// or a parse failure from [`FileInventory::from_yaml`].
    pub async fn load(path: &Path) -> Result<Self> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DeployError::lookup(
                    format!("inventory {}", path.display()),
                    "file not found",
                ));
            }
            Err(e) => return Err(e.into()),
        };
        let inventory = Self::from_yaml(&content)?;
        tracing::debug!(
            path = %path.display(),
            clusters = inventory.clusters.len(),
            load_balancers = inventory.load_balancers.len(),
            "loaded cloud inventory"
        );
        Ok(inventory)
    }
}

impl CloudProvider for FileInventory {
    fn cluster_oidc_issuer<'a>(&'a self, cluster: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            self.clusters
                .get(cluster)
                .map(|c| c.oidc_issuer.clone())
                .filter(|issuer| !issuer.is_empty())
                .ok_or_else(|| {
                    DeployError::lookup(format!("cluster {cluster}"), "no OIDC issuer in inventory")
                })
        })
    }

    fn load_balancer_dns_name<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            self.load_balancers
                .get(name)
                .map(|lb| lb.dns_name.clone())
                .ok_or_else(|| {
                    DeployError::lookup(format!("load balancer {name}"), "not in inventory")
                })
        })
    }

    fn alb_hosted_zone_id<'a>(&'a self, region: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            self.alb_hosted_zone_ids
                .get(region)
                .cloned()
                .or_else(|| builtin_alb_hosted_zone_id(region).map(str::to_string))
                .ok_or_else(|| {
                    DeployError::lookup(format!("ALB hosted zone for {region}"), "unknown region")
                })
        })
    }
}
