//! Load balancer annotation composition.
//!
//! Each release exposes two ingresses: an internal one and a public one. Their
//! AWS Load Balancer Controller annotations start from a fixed base set per
//! [`Tier`] and are then adjusted by a short, ordered list of overlay rules
//! ([`OVERLAY_RULES`]):
//!
//! 1. `production` - dedicated load balancers named after the stack, the shared
//!    TLS certificate, and the ALB security group on the public tier.
//! 2. `shared-vcluster` - non-production stacks share `vcluster-*` load
//!    balancers and get a predictable external-dns hostname.
//! 3. `dev-security-group` - the `dev` stack also pins the ALB security group
//!    on its public tier.
//!
//! Rules are evaluated in that order and later rules win on key collisions.
//! [`compose`] is pure: it builds a new [`AnnotationSet`] on every call.

use crate::config::ProjectSettings;
use crate::constants::{
    ANN_CERTIFICATE_ARN, ANN_EXTERNAL_DNS_HOSTNAME, ANN_GROUP_NAME, ANN_HEALTHCHECK_PATH,
    ANN_LISTEN_PORTS, ANN_LOAD_BALANCER_NAME, ANN_MANAGE_BACKEND_SG_RULES, ANN_SCHEME,
    ANN_SECURITY_GROUPS, ANN_SSL_REDIRECT, ANN_TARGET_TYPE, LISTEN_PORTS, VCLUSTER_LB_PREFIX,
};
use crate::context::StackName;
use crate::references::UpstreamRefs;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Visibility tier of an ingress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Tier {
    /// VPC-internal ALB
    Internal,
    /// Internet-facing ALB
    Public,
}

impl Tier {
    /// Both tiers, internal first.
    pub const ALL: [Self; 2] = [Self::Internal, Self::Public];

    /// Lowercase tier name used in load balancer and group names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::Public => "public",
        }
    }

    const fn scheme(self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::Public => "internet-facing",
        }
    }

    const fn hostname_infix(self) -> &'static str {
        match self {
            Self::Internal => "",
            Self::Public => "webhook-",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered annotation map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnnotationSet(BTreeMap<String, String>);

/// Annotations to lay over a set; values replace existing keys.
pub type Overlay = Vec<(&'static str, String)>;

impl AnnotationSet {
    /// Base annotations for `tier`.
    #[must_use]
    pub fn base(tier: Tier) -> Self {
        let mut entries: Overlay = vec![
            (ANN_SCHEME, tier.scheme().to_string()),
            (ANN_HEALTHCHECK_PATH, "/health".to_string()),
            (ANN_TARGET_TYPE, "ip".to_string()),
            (ANN_GROUP_NAME, format!("{tier}-apps")),
            (ANN_LISTEN_PORTS, LISTEN_PORTS.to_string()),
            (ANN_SSL_REDIRECT, "443".to_string()),
        ];
        if tier == Tier::Public {
            entries.push((ANN_MANAGE_BACKEND_SG_RULES, "true".to_string()));
        }
        Self::default().overlay(&entries)
    }

    /// New set with `overlay` applied on top of `self`.
    #[must_use]
    pub fn overlay(&self, overlay: &[(&'static str, String)]) -> Self {
        let mut map = self.0.clone();
        for (key, value) in overlay {
            map.insert((*key).to_string(), value.clone());
        }
        Self(map)
    }

    /// Value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of annotations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Everything the overlay rules read.
#[derive(Debug, Clone)]
pub struct AnnotationInputs<'a> {
    /// Active stack
    pub stack: &'a StackName,
    /// ALB security group (`securityGroupId`)
    pub security_group_id: &'a str,
    /// Listener certificate (`certArnWebHook`)
    pub certificate_arn: &'a str,
    /// Host label for non-production hostnames
    pub dns_label: &'a str,
    /// Zone for non-production hostnames
    pub dns_zone: &'a str,
}

impl<'a> AnnotationInputs<'a> {
    /// Inputs for `stack` from resolved references and project settings.
    #[must_use]
    pub fn resolved(
        stack: &'a StackName,
        refs: &'a UpstreamRefs,
        project: &'a ProjectSettings,
    ) -> Self {
        Self {
            stack,
            security_group_id: &refs.security_group_id,
            certificate_arn: &refs.cert_arn_web_hook,
            dns_label: project.dns_label(),
            dns_zone: &project.dns_zone,
        }
    }
}

/// A named overlay guarded by a predicate.
pub struct OverlayRule {
    /// Rule name, for logs and tests
    pub name: &'static str,
    /// Whether the rule applies to this stack and tier
    pub applies: fn(&AnnotationInputs<'_>, Tier) -> bool,
    /// Annotations contributed when the rule applies
    pub build: fn(&AnnotationInputs<'_>, Tier) -> Overlay,
}

/// Overlay rules in evaluation order.
pub static OVERLAY_RULES: [OverlayRule; 3] = [
    OverlayRule {
        name: "production",
        applies: |inputs, _| inputs.stack.is_production(),
        build: production_overlay,
    },
    OverlayRule {
        name: "shared-vcluster",
        applies: |inputs, _| !inputs.stack.is_production(),
        build: shared_vcluster_overlay,
    },
    OverlayRule {
        name: "dev-security-group",
        applies: |inputs, tier| inputs.stack.is_dev() && tier == Tier::Public,
        build: |inputs, _| vec![(ANN_SECURITY_GROUPS, inputs.security_group_id.to_string())],
    },
];

fn production_overlay(inputs: &AnnotationInputs<'_>, tier: Tier) -> Overlay {
    let mut overlay = vec![
        (
            ANN_LOAD_BALANCER_NAME,
            format!("{}-{tier}-apps", inputs.stack),
        ),
        (ANN_CERTIFICATE_ARN, inputs.certificate_arn.to_string()),
    ];
    if tier == Tier::Public {
        overlay.push((ANN_SECURITY_GROUPS, inputs.security_group_id.to_string()));
    }
    overlay
}

fn shared_vcluster_overlay(inputs: &AnnotationInputs<'_>, tier: Tier) -> Overlay {
    vec![
        (
            ANN_LOAD_BALANCER_NAME,
            format!("{VCLUSTER_LB_PREFIX}-{tier}-apps"),
        ),
        (
            ANN_EXTERNAL_DNS_HOSTNAME,
            format!(
                "{}-{}{}.{}.",
                inputs.stack,
                tier.hostname_infix(),
                inputs.dns_label,
                inputs.dns_zone
            ),
        ),
    ]
}

/// Names of the rules that apply to `tier`, in evaluation order.
#[must_use]
pub fn applicable_rules(tier: Tier, inputs: &AnnotationInputs<'_>) -> Vec<&'static str> {
    OVERLAY_RULES
        .iter()
        .filter(|rule| (rule.applies)(inputs, tier))
        .map(|rule| rule.name)
        .collect()
}

/// Build the annotation set for `tier`.
#[must_use]
pub fn compose(tier: Tier, inputs: &AnnotationInputs<'_>) -> AnnotationSet {
    let set = OVERLAY_RULES
        .iter()
        .filter(|rule| (rule.applies)(inputs, tier))
        .fold(AnnotationSet::base(tier), |set, rule| {
            set.overlay(&(rule.build)(inputs, tier))
        });

    tracing::debug!(%tier, stack = %inputs.stack, annotations = set.len(), "composed annotations");
    set
}
