//! Error handling for doc-mgmt-deploy
//!
//! This module provides the error types and user-friendly error reporting for the
//! deployment configuration tool. The error system follows two principles:
//! 1. **Strongly-typed errors** so callers can tell fatal categories apart
//! 2. **User-friendly messages** with actionable suggestions for operators
//!
//! # Architecture
//!
//! - [`DeployError`] - Enumerated error types for every failure in a deployment run
//! - [`ErrorContext`] - Wrapper that adds user-friendly details and suggestions
//!
//! # Error Categories
//!
//! - **Configuration**: [`DeployError::ConfigurationMissing`],
//!   [`DeployError::InvalidConfiguration`], [`DeployError::ManifestNotFound`],
//!   [`DeployError::ManifestParse`]
//! - **Cross-stack references**: [`DeployError::ReferenceNotFound`]
//! - **Provider lookups**: [`DeployError::Lookup`], [`DeployError::InvalidIssuerUrl`]
//! - **Release engine**: [`DeployError::Engine`]
//! - **Everything else**: [`DeployError::Other`] carries the message of a foreign error
//!
//! Every category is fatal. A deployment never proceeds with partially resolved
//! configuration, so none of these errors is retried locally.
//!
//! # Examples
//!
//! ```rust,no_run
//! use doc_mgmt_deploy::core::{DeployError, user_friendly_error};
//!
//! let error = DeployError::ReferenceNotFound {
//!     stack: "acme/doc-mgmt-infra/dev".to_string(),
//!     key: "bucketArn".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Convenience result type for library operations.
pub type Result<T> = std::result::Result<T, DeployError>;

/// The main error type for deployment configuration operations.
///
/// # Error Categories
///
/// ## Configuration
/// - [`ConfigurationMissing`] - A required config key, secret or env variable is absent
/// - [`InvalidConfiguration`] - A value is present but malformed
/// - [`ManifestNotFound`] - No `deploy.toml` could be located
/// - [`ManifestParse`] - `deploy.toml` is not valid TOML or has the wrong shape
///
/// ## Resolution
/// - [`ReferenceNotFound`] - A cross-stack output (or the whole stack) does not exist
/// - [`Lookup`] - A provider lookup (cluster, load balancer, hosted zone) failed
/// - [`InvalidIssuerUrl`] - The cluster OIDC issuer is not a usable https URL
///
/// [`ConfigurationMissing`]: DeployError::ConfigurationMissing
/// [`InvalidConfiguration`]: DeployError::InvalidConfiguration
/// [`ManifestNotFound`]: DeployError::ManifestNotFound
/// [`ManifestParse`]: DeployError::ManifestParse
/// [`ReferenceNotFound`]: DeployError::ReferenceNotFound
/// [`Lookup`]: DeployError::Lookup
/// [`InvalidIssuerUrl`]: DeployError::InvalidIssuerUrl
#[derive(Error, Debug)]
pub enum DeployError {
    /// A required configuration value, secret or environment variable is not set
    ///
    /// Raised before any artifact is constructed. Misconfiguration is a
    /// deployment-time human error, so it is never retried.
    #[error("Required configuration '{key}' is not set")]
    ConfigurationMissing {
        /// Name of the missing key (config key, secret name or env variable)
        key: String,
        /// Where the value was expected to come from
        origin: String,
    },

    /// A configuration value is present but unusable
    #[error("Invalid configuration '{key}': {reason}")]
    InvalidConfiguration {
        /// Name of the offending key
        key: String,
        /// Why the value was rejected
        reason: String,
    },

    /// Project manifest could not be located
    #[error("Manifest file deploy.toml not found (searched from {searched})")]
    ManifestNotFound {
        /// Directory or explicit path that was searched
        searched: String,
    },

    /// Project manifest could not be parsed
    #[error("Invalid manifest file {file}")]
    ManifestParse {
        /// Path to the manifest
        file: String,
        /// Parser message
        reason: String,
    },

    /// A cross-stack reference does not exist
    ///
    /// Indicates a missing prerequisite deployment of the infra stack.
    #[error("Output '{key}' not found in stack '{stack}'")]
    ReferenceNotFound {
        /// Stack path in `org/project-infra/stack` form
        stack: String,
        /// Requested output key
        key: String,
    },

    /// A cloud provider lookup failed
    #[error("Lookup of {resource} failed: {reason}")]
    Lookup {
        /// Resource being looked up, e.g. `load balancer 'prod-public-apps'`
        resource: String,
        /// Failure description
        reason: String,
    },

    /// The OIDC issuer URL cannot be turned into a federated principal
    #[error("Invalid OIDC issuer URL '{url}': {reason}")]
    InvalidIssuerUrl {
        /// The URL reported by the cluster
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// The release engine rejected or failed to apply a descriptor
    #[error("Release engine failed: {reason}")]
    Engine {
        /// Engine-provided failure description
        reason: String,
    },

    /// Rendering a document failed
    #[error("Failed to serialize {what}: {reason}")]
    Serialization {
        /// What was being serialized
        what: String,
        /// Serializer message
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Any error that is not a [`DeployError`], with its cause chain
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl DeployError {
    /// Shorthand for [`DeployError::ConfigurationMissing`].
    pub fn missing(key: impl Into<String>, origin: impl Into<String>) -> Self {
        Self::ConfigurationMissing {
            key: key.into(),
            origin: origin.into(),
        }
    }

    /// Shorthand for [`DeployError::InvalidConfiguration`].
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`DeployError::Lookup`].
    pub fn lookup(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Lookup {
            resource: resource.into(),
            reason: reason.into(),
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// Combines a [`DeployError`] with optional details and a suggestion so the CLI
/// can tell the operator what failed and what to fix.
///
/// # Examples
///
/// ```rust,no_run
/// use doc_mgmt_deploy::core::{DeployError, ErrorContext};
///
/// let context = ErrorContext::new(DeployError::missing("namespace", "deploy.toml [stacks.dev]"))
///     .with_suggestion("Add 'namespace' to the stack table")
///     .with_details("Every stack needs a Kubernetes namespace");
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: DeployError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: DeployError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`]
///
/// Recognizes [`DeployError`] anywhere at the top of the chain and attaches
/// tailored suggestions. Anything else is reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let error = match error.downcast::<DeployError>() {
        Ok(deploy_error) => return create_error_context(deploy_error),
        Err(other) => other,
    };

    // An anyhow context wrapping a DeployError still deserves the tailored message
    let mut causes = error.chain();
    if let Some(cause) = causes.find_map(|c| c.downcast_ref::<DeployError>()) {
        let details = error.to_string();
        let ctx = create_error_context(clone_for_display(cause));
        return match ctx.details {
            Some(_) => ctx,
            None => ctx.with_details(details),
        };
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(DeployError::Other { message })
}

// io::Error is not Clone, so a borrowed cause is rebuilt from its parts.
fn clone_for_display(error: &DeployError) -> DeployError {
    match error {
        DeployError::ConfigurationMissing { key, origin } => DeployError::missing(key, origin),
        DeployError::InvalidConfiguration { key, reason } => DeployError::invalid(key, reason),
        DeployError::ManifestNotFound { searched } => DeployError::ManifestNotFound {
            searched: searched.clone(),
        },
        DeployError::ManifestParse { file, reason } => DeployError::ManifestParse {
            file: file.clone(),
            reason: reason.clone(),
        },
        DeployError::ReferenceNotFound { stack, key } => DeployError::ReferenceNotFound {
            stack: stack.clone(),
            key: key.clone(),
        },
        DeployError::Lookup { resource, reason } => DeployError::lookup(resource, reason),
        DeployError::InvalidIssuerUrl { url, reason } => DeployError::InvalidIssuerUrl {
            url: url.clone(),
            reason: reason.clone(),
        },
        DeployError::Engine { reason } => DeployError::Engine {
            reason: reason.clone(),
        },
        DeployError::Serialization { what, reason } => DeployError::Serialization {
            what: what.clone(),
            reason: reason.clone(),
        },
        DeployError::Io(io) => DeployError::Io(std::io::Error::new(io.kind(), io.to_string())),
        DeployError::Other { message } => DeployError::Other {
            message: message.clone(),
        },
    }
}

fn create_error_context(error: DeployError) -> ErrorContext {
    match &error {
        DeployError::ConfigurationMissing { key, origin } => {
            let suggestion = format!("Set '{key}' in {origin} and re-run");
            ErrorContext::new(error)
                .with_suggestion(suggestion)
                .with_details("Inputs are checked before anything is built; nothing was rendered")
        }
        DeployError::InvalidConfiguration { key, .. } => {
            let suggestion =
                format!("Correct the value of '{key}' in deploy.toml or the environment");
            ErrorContext::new(error).with_suggestion(suggestion)
        }
        DeployError::ManifestNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Create deploy.toml in the project directory or pass --manifest-path")
            .with_details("deploy.toml is searched for in the current directory and its parents"),
        DeployError::ManifestParse { reason, .. } => {
            let details = reason.clone();
            ErrorContext::new(error)
                .with_suggestion("Check the TOML syntax and the keys of every stack table")
                .with_details(details)
        }
        DeployError::ReferenceNotFound { stack, .. } => {
            let suggestion =
                format!("Deploy '{stack}' first or export its outputs to the references directory");
            ErrorContext::new(error)
                .with_suggestion(suggestion)
                .with_details("Cross-stack outputs are prerequisites; the run was aborted")
        }
        DeployError::Lookup { .. } => ErrorContext::new(error)
            .with_suggestion("Check the resource exists, or refresh the inventory file")
            .with_details("Downstream DNS depends on these values; nothing partial is exported"),
        DeployError::InvalidIssuerUrl { .. } => ErrorContext::new(error)
            .with_suggestion("Check that the EKS cluster has an OIDC provider associated")
            .with_details("Without a valid issuer the service account cannot assume the role"),
        DeployError::Engine { .. }
        | DeployError::Serialization { .. }
        | DeployError::Io(_)
        | DeployError::Other { .. } => ErrorContext::new(error),
    }
}
