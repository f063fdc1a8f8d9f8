//! IAM documents for the pod execution role.
//!
//! The service runs under a role that its Kubernetes service account assumes
//! through the cluster's OIDC provider (IRSA). This module builds:
//!
//! - the permissions document ([`build_execution_policy`]),
//! - the service-account `sub` claim ([`ServiceAccountIdentity`]),
//! - the federated trust document ([`build_trust_policy`]),
//! - the policy and role definitions that bundle them ([`IamArtifacts`]).
//!
//! Documents serialize to the IAM JSON policy grammar: a single action renders
//! as a string, several as an array.

mod execution;
mod role;
mod trust;

pub use execution::{TEMPLATE_READ_ACTIONS, build_execution_policy};
pub use role::{ExecutionPolicySpec, ExecutionRoleSpec, IamArtifacts};
pub use trust::{ServiceAccountIdentity, build_trust_policy, issuer_host};

use crate::constants::IAM_POLICY_VERSION;
use crate::core::{DeployError, Result};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

/// Statement effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    /// Grant
    Allow,
    /// Explicit deny
    Deny,
}

/// Condition operators used by the builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ConditionOperator {
    /// Exact, case-sensitive match
    StringEquals,
    /// Wildcard match
    StringLike,
}

/// One condition: `test` applied to `variable` against `values`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustCondition {
    /// Operator
    pub test: ConditionOperator,
    /// Context key, e.g. `oidc.eks.us-east-1.amazonaws.com/id/ABC:sub`
    pub variable: String,
    /// Accepted values
    pub values: Vec<String>,
}

/// A single policy statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    /// Optional statement id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,

    /// Allow or deny
    pub effect: Effect,

    /// Actions; `*` and `service:*` wildcards are allowed
    #[serde(rename = "Action", serialize_with = "one_or_many")]
    pub actions: Vec<String>,

    /// Resource ARNs or ARN patterns, in order
    #[serde(rename = "Resource", skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,

    /// Principals by type (`Federated`, `AWS`, `Service`)
    #[serde(
        rename = "Principal",
        skip_serializing_if = "BTreeMap::is_empty",
        serialize_with = "principal_block"
    )]
    pub principals: BTreeMap<String, Vec<String>>,

    /// Conditions; grouped by operator when rendered
    #[serde(
        rename = "Condition",
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "condition_block"
    )]
    pub conditions: Vec<TrustCondition>,
}

impl PolicyStatement {
    /// An `Allow` statement over `actions` with nothing else set.
    pub fn allow<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut deduped: Vec<String> = Vec::new();
        for action in actions {
            let action = action.into();
            if !deduped.contains(&action) {
                deduped.push(action);
            }
        }
        Self {
            sid: None,
            effect: Effect::Allow,
            actions: deduped,
            resources: Vec::new(),
            principals: BTreeMap::new(),
            conditions: Vec::new(),
        }
    }

    /// Set the statement id.
    #[must_use]
    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    /// Append resources.
    #[must_use]
    pub fn on<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources.extend(resources.into_iter().map(Into::into));
        self
    }

    /// Add a principal of `kind` (e.g. `Federated`).
    #[must_use]
    pub fn with_principal(
        mut self,
        kind: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        self.principals
            .entry(kind.into())
            .or_default()
            .push(identifier.into());
        self
    }

    /// Add a condition.
    #[must_use]
    pub fn with_condition(mut self, condition: TrustCondition) -> Self {
        self.conditions.push(condition);
        self
    }
}

/// A versioned policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyDocument {
    /// Policy language version
    #[serde(rename = "Version")]
    pub version: String,

    /// Statements in order
    #[serde(rename = "Statement")]
    pub statements: Vec<PolicyStatement>,
}

impl PolicyDocument {
    /// Document at the current policy language version.
    #[must_use]
    pub fn new(statements: Vec<PolicyStatement>) -> Self {
        Self {
            version: IAM_POLICY_VERSION.to_string(),
            statements,
        }
    }

    /// Compact JSON, as submitted to IAM.
    ///
    /// # Errors
    ///
    /// [`DeployError::Serialization`] if rendering fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| DeployError::Serialization {
            what: "policy document".to_string(),
            reason: e.to_string(),
        })
    }
}

fn one_or_many<S: Serializer>(
    values: &[String],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match values {
        [single] => serializer.serialize_str(single),
        many => many.serialize(serializer),
    }
}

struct OneOrMany<'a>(&'a [String]);

impl Serialize for OneOrMany<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        one_or_many(self.0, serializer)
    }
}

fn principal_block<S: Serializer>(
    principals: &BTreeMap<String, Vec<String>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(principals.len()))?;
    for (kind, identifiers) in principals {
        map.serialize_entry(kind, &OneOrMany(identifiers))?;
    }
    map.end()
}

// Conditions sharing an operator and variable are merged by the last writer,
// matching how IAM itself treats duplicate keys.
fn condition_block<S: Serializer>(
    conditions: &[TrustCondition],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut grouped: BTreeMap<ConditionOperator, BTreeMap<&str, OneOrMany<'_>>> = BTreeMap::new();
    for condition in conditions {
        grouped
            .entry(condition.test)
            .or_default()
            .insert(condition.variable.as_str(), OneOrMany(&condition.values));
    }
    let mut map = serializer.serialize_map(Some(grouped.len()))?;
    for (operator, variables) in &grouped {
        map.serialize_entry(operator, variables)?;
    }
    map.end()
}
