//! Secret inputs for the release.
//!
//! The chart receives a fixed set of secrets (e-signature credentials, the
//! telemetry license key and the API key list). They are fetched from a
//! [`SecretSource`] concurrently and collected into a [`SecretBundle`]; a
//! missing or empty secret aborts the run before any artifact is built.

mod env;
mod memory;

pub use env::EnvSecrets;
pub use memory::MemorySecrets;

use crate::core::{DeployError, Result};
use futures::future::{BoxFuture, try_join_all};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Names of the secrets handed to the chart, in chart order.
pub const SECRET_KEYS: [&str; 6] = [
    "DOCU_SIGN__CLIENT_ID",
    "DOCU_SIGN__PRIVATE_KEY_ENCODED",
    "DOCU_SIGN__ACCOUNT_ID",
    "DOCU_SIGN__IMPERSONATED_USER_ID",
    "NEW_RELIC_LICENSE_KEY",
    "AUTH__API_KEYS",
];

const REDACTED: &str = "[redacted]";

/// A secret string. `Debug` never shows the value; `Serialize` does, because
/// the release engine needs it.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretValue(String);

impl SecretValue {
    /// Wrap a plaintext value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The plaintext value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Placeholder used when a descriptor is shown to a person.
    #[must_use]
    pub fn redacted() -> Self {
        Self(REDACTED.to_string())
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl Serialize for SecretValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Where secret values come from.
pub trait SecretSource: Send + Sync {
    /// Fetch `key`; `Ok(None)` when the source simply does not have it.
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<SecretValue>>>;

    /// Human-readable origin used in "missing" errors.
    fn describe(&self, key: &str) -> String;
}

/// All chart secrets, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SecretBundle(BTreeMap<String, SecretValue>);

impl SecretBundle {
    /// Fetch every key in [`SECRET_KEYS`] concurrently.
    ///
    /// # Errors
    ///
    /// [`DeployError::ConfigurationMissing`] for the first absent or empty secret,
    /// or whatever error the source reports.
    pub async fn fetch(source: &dyn SecretSource) -> Result<Self> {
        let lookups = SECRET_KEYS.iter().map(|key| async move {
            match source.get(key).await? {
                Some(value) if !value.expose().is_empty() => Ok((key.to_string(), value)),
                _ => Err(DeployError::missing(*key, source.describe(key))),
            }
        });

        let values = try_join_all(lookups).await?;
        tracing::debug!(count = values.len(), "fetched chart secrets");
        Ok(Self(values.into_iter().collect()))
    }

    /// Secret `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SecretValue> {
        self.0.get(key)
    }

    /// Same keys with every value replaced by a placeholder.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let keys = self.0.keys().cloned();
        Self(keys.map(|k| (k, SecretValue::redacted())).collect())
    }

    /// Iterate over secret names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromIterator<(String, SecretValue)> for SecretBundle {
    fn from_iter<I: IntoIterator<Item = (String, SecretValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
