//! In-memory provider with call accounting.

use super::CloudProvider;
use crate::core::{DeployError, Result};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Answers from fixed tables and counts every call.
#[derive(Debug, Default)]
pub struct StaticProvider {
    issuers: HashMap<String, String>,
    load_balancers: HashMap<String, String>,
    zone_ids: HashMap<String, String>,
    calls: AtomicUsize,
}

impl StaticProvider {
    /// Provider that knows nothing; every lookup fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cluster and its OIDC issuer.
    #[must_use]
    pub fn with_cluster(mut self, cluster: impl Into<String>, issuer: impl Into<String>) -> Self {
        self.issuers.insert(cluster.into(), issuer.into());
        self
    }

    /// Register a load balancer by name.
    #[must_use]
    pub fn with_load_balancer(
        mut self,
        name: impl Into<String>,
        dns_name: impl Into<String>,
    ) -> Self {
        self.load_balancers.insert(name.into(), dns_name.into());
        self
    }

    /// Register the load balancer hosted zone for a region.
    #[must_use]
    pub fn with_zone_id(mut self, region: impl Into<String>, zone_id: impl Into<String>) -> Self {
        self.zone_ids.insert(region.into(), zone_id.into());
        self
    }

    /// Number of lookups made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer(&self, table: &HashMap<String, String>, kind: &str, key: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        table
            .get(key)
            .cloned()
            .ok_or_else(|| DeployError::lookup(format!("{kind} {key}"), "not found"))
    }
}

impl CloudProvider for StaticProvider {
    fn cluster_oidc_issuer<'a>(&'a self, cluster: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move { self.answer(&self.issuers, "cluster", cluster) })
    }

    fn load_balancer_dns_name<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move { self.answer(&self.load_balancers, "load balancer", name) })
    }

    fn alb_hosted_zone_id<'a>(&'a self, region: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move { self.answer(&self.zone_ids, "ALB hosted zone for", region) })
    }
}
