//! Project configuration.
//!
//! Deployment settings live in a `deploy.toml` manifest at the root of the
//! deploy project. See [`manifest`] for the file format and the validation
//! rules applied per stack.

mod manifest;

pub use manifest::{
    Manifest, ProjectSettings, ResolvedStackConfig, StackConfig, find_manifest_from,
    find_manifest_with_optional,
};
