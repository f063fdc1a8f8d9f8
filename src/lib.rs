//! Deployment configuration for the document management service.
//!
//! `doc-mgmt-deploy` derives everything one stack of the service needs to be
//! released: load balancer annotations for its internal and public ingresses,
//! an IAM execution policy and a role whose trust policy federates the pod's
//! Kubernetes service account, and the Helm release descriptor that ties them
//! together. Production runs additionally look up the DNS names of their
//! dedicated load balancers once the release has been applied.
//!
//! # Architecture
//!
//! The crate is a set of small builders around a single immutable
//! [`context::StackContext`]:
//!
//! - [`context`] - stack, account, region and project, resolved once
//! - [`config`] - the `deploy.toml` manifest and per-stack settings
//! - [`references`] - outputs of the upstream infra stack, fetched concurrently
//! - [`secrets`] - chart secrets
//! - [`annotations`] - pure composition of ALB annotation sets
//! - [`iam`] - execution policy, service-account identity, trust policy, role
//! - [`release`] - the release descriptor and release engines
//! - [`provider`] - cloud lookups (OIDC issuer, load balancers, hosted zones)
//! - [`post_release`] - production-only lookups after the release
//! - [`deployment`] - orchestration of one run
//!
//! External systems (release engine, cloud APIs, cross-stack state, secret
//! storage) sit behind traits, with file-backed and in-memory implementations
//! shipped here.
//!
//! # Example
//!
//! ```bash
//! # Print what the dev stack's role will trust
//! doc-mgmt-deploy --stack dev identity
//!
//! # Render the staging release with the image built by CI
//! IMAGE_TAG=1.4.2 doc-mgmt-deploy --stack staging render --output release.yaml
//!
//! # Full production run, printing exported values
//! doc-mgmt-deploy --stack prod deploy
//! ```

pub mod annotations;
pub mod cli;
pub mod config;
pub mod constants;
pub mod context;
pub mod core;
pub mod deployment;
pub mod iam;
pub mod post_release;
pub mod provider;
pub mod references;
pub mod release;
pub mod secrets;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
