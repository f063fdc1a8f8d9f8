//! Core types shared by every stage of a deployment run.
//!
//! Currently this is the error taxonomy and its user-facing rendering; see
//! [`error`] for the categories and how the CLI presents them.

pub mod error;

pub use error::{DeployError, ErrorContext, Result, user_friendly_error};
