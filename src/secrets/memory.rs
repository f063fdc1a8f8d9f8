//! In-memory secret source.

use super::{SecretSource, SecretValue};
use crate::core::Result;
use futures::future::BoxFuture;
use std::collections::HashMap;

/// Secret source backed by a map, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySecrets {
    values: HashMap<String, SecretValue>,
}

impl MemorySecrets {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), SecretValue::new(value));
        self
    }

    /// Remove `key`.
    #[must_use]
    pub fn without(mut self, key: &str) -> Self {
        self.values.remove(key);
        self
    }
}

impl SecretSource for MemorySecrets {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<SecretValue>>> {
        Box::pin(async move { Ok(self.values.get(key).cloned()) })
    }

    fn describe(&self, _key: &str) -> String {
        "the in-memory secret source".to_string()
    }
}
