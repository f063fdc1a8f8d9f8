//! Cloud lookups needed around a release.
//!
//! Three questions are asked of the cloud: the OIDC issuer of the EKS cluster
//! (before the release, for the trust policy), and the DNS names of the two
//! production load balancers plus the ALB canonical hosted-zone id (after the
//! release). [`CloudProvider`] abstracts them; [`FileInventory`] answers from
//! an inventory snapshot exported by the infra tooling.

mod fixed;
mod inventory;

pub use fixed::StaticProvider;
pub use inventory::FileInventory;

use crate::core::Result;
use futures::future::BoxFuture;

/// ALB canonical hosted-zone ids per region.
pub const ALB_HOSTED_ZONE_IDS: [(&str, &str); 11] = [
    ("us-east-1", "Z35SXDOTRQ7X7K"),
    ("us-east-2", "Z3AADJGX6KTTL2"),
    ("us-west-1", "Z368ELLRRE2KJ0"),
    ("us-west-2", "Z1H1FL5HABSF5"),
    ("ca-central-1", "ZQSVJUPU6J1EY"),
    ("eu-west-1", "Z32O12XQLNTSW2"),
    ("eu-west-2", "ZHURV8PSTC4K8"),
    ("eu-central-1", "Z215JYRZR1TBD5"),
    ("ap-southeast-1", "Z1LMS91P8CMLE5"),
    ("ap-southeast-2", "Z1GM3OXH4ZPM65"),
    ("ap-northeast-1", "Z14GRHDCWA56QT"),
];

/// Built-in ALB hosted-zone id for `region`.
#[must_use]
pub fn builtin_alb_hosted_zone_id(region: &str) -> Option<&'static str> {
    ALB_HOSTED_ZONE_IDS
        .iter()
        .find(|(r, _)| *r == region)
        .map(|(_, id)| *id)
}

/// Read-only cloud lookups.
///
/// Implementations report an unknown resource as [`DeployError::Lookup`].
///
/// [`DeployError::Lookup`]: crate::core::DeployError::Lookup
pub trait CloudProvider: Send + Sync {
    /// OIDC issuer URL of EKS cluster `cluster`.
    fn cluster_oidc_issuer<'a>(&'a self, cluster: &'a str) -> BoxFuture<'a, Result<String>>;

    /// DNS name of load balancer `name`.
    fn load_balancer_dns_name<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<String>>;

    /// Canonical hosted-zone id of application load balancers in `region`.
    fn alb_hosted_zone_id<'a>(&'a self, region: &'a str) -> BoxFuture<'a, Result<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_zone_ids() {
        assert_eq!(
            builtin_alb_hosted_zone_id("us-east-1"),
            Some("Z35SXDOTRQ7X7K")
        );
        assert_eq!(
            builtin_alb_hosted_zone_id("eu-central-1"),
            Some("Z215JYRZR1TBD5")
        );
        assert_eq!(builtin_alb_hosted_zone_id("mars-north-1"), None);
    }
}
