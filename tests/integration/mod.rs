//! Integration test suite for doc-mgmt-deploy
//!
//! End-to-end tests that run the binary against a sample project in a
//! temporary directory: `deploy.toml`, exported infra stack outputs under
//! `.stack-outputs/` and a cloud inventory snapshot.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **identity**: service-account identity per stack
//! - **annotations**: annotation sets per stack and tier
//! - **policy**: execution policy, trust policy and role definition
//! - **render**: release descriptor rendering, secrets and image tag handling
//! - **deploy**: full runs with the render engine and exported values
//! - **validate**: fail-fast validation report
//! - **error_scenarios**: user-facing errors for missing inputs

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod annotations;
mod deploy;
mod error_scenarios;
mod identity;
mod policy;
mod render;
mod validate;
