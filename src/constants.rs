//! Constants shared across the configuration builders.
//!
//! Annotation keys, IAM identifiers and release defaults live here so the
//! builders and their tests agree on a single spelling.

/// `alb.ingress.kubernetes.io/scheme`
pub const ANN_SCHEME: &str = "alb.ingress.kubernetes.io/scheme";
/// `alb.ingress.kubernetes.io/healthcheck-path`
pub const ANN_HEALTHCHECK_PATH: &str = "alb.ingress.kubernetes.io/healthcheck-path";
/// `alb.ingress.kubernetes.io/target-type`
pub const ANN_TARGET_TYPE: &str = "alb.ingress.kubernetes.io/target-type";
/// `alb.ingress.kubernetes.io/group.name`
pub const ANN_GROUP_NAME: &str = "alb.ingress.kubernetes.io/group.name";
/// `alb.ingress.kubernetes.io/listen-ports`
pub const ANN_LISTEN_PORTS: &str = "alb.ingress.kubernetes.io/listen-ports";
/// `alb.ingress.kubernetes.io/ssl-redirect`
pub const ANN_SSL_REDIRECT: &str = "alb.ingress.kubernetes.io/ssl-redirect";
/// `alb.ingress.kubernetes.io/manage-backend-security-group-rules`
pub const ANN_MANAGE_BACKEND_SG_RULES: &str =
    "alb.ingress.kubernetes.io/manage-backend-security-group-rules";
/// `alb.ingress.kubernetes.io/load-balancer-name`
pub const ANN_LOAD_BALANCER_NAME: &str = "alb.ingress.kubernetes.io/load-balancer-name";
/// `alb.ingress.kubernetes.io/certificate-arn`
pub const ANN_CERTIFICATE_ARN: &str = "alb.ingress.kubernetes.io/certificate-arn";
/// `alb.ingress.kubernetes.io/security-groups`
pub const ANN_SECURITY_GROUPS: &str = "alb.ingress.kubernetes.io/security-groups";
/// `external-dns.alpha.kubernetes.io/hostname`
pub const ANN_EXTERNAL_DNS_HOSTNAME: &str = "external-dns.alpha.kubernetes.io/hostname";

/// Listener configuration shared by both tiers.
pub const LISTEN_PORTS: &str = r#"[{"HTTP": 80}, {"HTTPS": 443}]"#;

/// Zone used for predictable non-production hostnames.
pub const DEFAULT_DNS_ZONE: &str = "prime.coverwhale.dev";

/// Shared load balancer prefix for stacks multiplexed in the virtual cluster.
pub const VCLUSTER_LB_PREFIX: &str = "vcluster";

/// IAM policy language version.
pub const IAM_POLICY_VERSION: &str = "2012-10-17";

/// Managed policies attached to every pod execution role.
pub const MANAGED_POLICY_ARNS: [&str; 2] = [
    "arn:aws:iam::aws:policy/AmazonEKS_CNI_Policy",
    "arn:aws:iam::aws:policy/AmazonEKSFargatePodExecutionRolePolicy",
];

/// Default chart location, relative to the deploy project.
pub const DEFAULT_CHART_PATH: &str = "../k8s/helm";

/// Release timeout handed to the engine, in seconds.
pub const RELEASE_TIMEOUT_SECS: u32 = 900;

/// Name of the project manifest.
pub const MANIFEST_FILE: &str = "deploy.toml";

/// Default directory holding exported infra stack outputs.
pub const DEFAULT_REFERENCES_DIR: &str = ".stack-outputs";

/// Default cloud inventory snapshot.
pub const DEFAULT_INVENTORY_FILE: &str = "inventory.yaml";

/// Default directory the render engine writes descriptors to.
pub const DEFAULT_RENDER_DIR: &str = ".rendered";
