//! Environment variable secret source.
//!
//! Reads secrets from variables named `{PREFIX}{KEY}`. With the default empty
//! prefix the variable names are exactly the chart's secret names, e.g.
//! `NEW_RELIC_LICENSE_KEY`.

use super::{SecretSource, SecretValue};
use crate::core::Result;
use futures::future::BoxFuture;

/// Read-only secret source over the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvSecrets {
    prefix: String,
}

impl EnvSecrets {
    /// Source with no prefix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Source reading `{prefix}{KEY}`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Configured prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn var_name(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

impl SecretSource for EnvSecrets {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<SecretValue>>> {
        Box::pin(async move {
            let var = self.var_name(key);
            Ok(std::env::var(var).ok().map(SecretValue::new))
        })
    }

    fn describe(&self, key: &str) -> String {
        format!("the environment variable {}", self.var_name(key))
    }
}
