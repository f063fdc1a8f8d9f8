//! Environment context for a single deployment run.
//!
//! The [`StackContext`] carries the stack name, AWS account, region and project
//! name. It is resolved once, validated eagerly, and then passed by reference
//! into every builder. Nothing in the crate reads these values from ambient
//! global state.

use crate::core::{DeployError, Result};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static ACCOUNT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{12}$").expect("account id pattern is valid"));

static REGION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}(-gov)?-[a-z]+-\d$").expect("region pattern is valid"));

/// A named deployment environment.
///
/// `prod` is the only production stack. `dev` gets a handful of stack-specific
/// overrides on top of the generic non-production behavior.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StackName {
    /// The `dev` stack.
    Dev,
    /// The `staging` stack.
    Staging,
    /// The `prod` stack.
    Prod,
    /// Any other non-production stack (feature stacks, previews, ...).
    Other(String),
}

impl StackName {
    /// Stack name as it appears in resource names.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Prod => "prod",
            Self::Other(name) => name,
        }
    }

    /// Whether this stack is the production environment.
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Prod)
    }

    /// Whether this is the `dev` stack.
    #[must_use]
    pub const fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }
}

impl FromStr for StackName {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DeployError::missing("stack", "--stack or DEPLOY_STACK"));
        }
        let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-';
        if !trimmed.chars().all(allowed) {
            return Err(DeployError::invalid(
                "stack",
                format!("'{trimmed}' must contain only lowercase letters, digits and '-'"),
            ));
        }
        Ok(match trimmed {
            "dev" => Self::Dev,
            "staging" => Self::Staging,
            "prod" => Self::Prod,
            other => Self::Other(other.to_string()),
        })
    }
}

impl fmt::Display for StackName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StackName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StackName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Raw inputs for building a [`StackContext`].
///
/// Each field is optional so that the resolver, not the caller, decides which
/// absences are fatal. Empty strings count as absent.
#[derive(Debug, Clone, Default)]
pub struct ContextInputs {
    /// Stack name (`--stack` / `DEPLOY_STACK`)
    pub stack: Option<String>,
    /// AWS account id (`--account-id` / `AWS_ACCOUNT_ID` / stack table)
    pub account_id: Option<String>,
    /// AWS region (`--region` / `AWS_REGION` / stack table)
    pub region: Option<String>,
    /// Project name (`[project] name`)
    pub project: Option<String>,
}

/// Immutable identity of the current deployment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackContext {
    /// Active stack
    pub stack: StackName,
    /// Twelve-digit AWS account id
    pub account_id: String,
    /// AWS region, e.g. `us-east-1`
    pub region: String,
    /// Project name, used in image, policy and role names
    pub project: String,
}

impl StackContext {
    /// Resolve and validate the context, failing fast on the first gap.
    ///
    /// # Errors
    ///
    /// - [`DeployError::ConfigurationMissing`] when any input is absent or empty
    /// - [`DeployError::InvalidConfiguration`] when the account id or region is malformed
    pub fn resolve(inputs: ContextInputs) -> Result<Self> {
        let stack = required(inputs.stack, "stack", "--stack or DEPLOY_STACK")?;
        let stack: StackName = stack.parse()?;
        let project = required(inputs.project, "project.name", "deploy.toml [project]")?;
        let account_id = required(
            inputs.account_id,
            "accountId",
            "--account-id, AWS_ACCOUNT_ID or the stack table",
        )?;
        let region = required(
            inputs.region,
            "region",
            "--region, AWS_REGION or the stack table",
        )?;

        if !ACCOUNT_ID.is_match(&account_id) {
            return Err(DeployError::invalid(
                "accountId",
                format!("'{account_id}' is not a twelve-digit AWS account id"),
            ));
        }
        if !REGION.is_match(&region) {
            return Err(DeployError::invalid(
                "region",
                format!("'{region}' is not an AWS region name"),
            ));
        }

        tracing::debug!(%stack, %region, %project, "resolved stack context");

        Ok(Self {
            stack,
            account_id,
            region,
            project,
        })
    }

    /// ECR registry host for this account and region.
    #[must_use]
    pub fn registry_host(&self) -> String {
        format!("{}.dkr.ecr.{}.amazonaws.com", self.account_id, self.region)
    }

    /// Tags applied to every IAM resource of this run.
    #[must_use]
    pub fn resource_tags(&self) -> std::collections::BTreeMap<String, String> {
        [
            ("project".to_string(), self.project.clone()),
            ("environment".to_string(), self.stack.to_string()),
        ]
        .into_iter()
        .collect()
    }
}

fn required(value: Option<String>, key: &str, origin: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(DeployError::missing(key, origin)),
    }
}
