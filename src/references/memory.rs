//! In-memory reference store.

use super::{ReferenceStore, StackReference};
use crate::core::{DeployError, Result};
use futures::future::BoxFuture;
use std::collections::HashMap;

/// Reference store backed by a map, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryReferenceStore {
    outputs: HashMap<String, HashMap<String, String>>,
}

impl MemoryReferenceStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `key = value` on `stack`.
    #[must_use]
    pub fn with_output(
        mut self,
        stack: &StackReference,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.outputs
            .entry(stack.path())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// Remove `key` from `stack`, if present.
    #[must_use]
    pub fn without_output(mut self, stack: &StackReference, key: &str) -> Self {
        if let Some(outputs) = self.outputs.get_mut(&stack.path()) {
            outputs.remove(key);
        }
        self
    }
}

impl ReferenceStore for MemoryReferenceStore {
    fn get_output<'a>(
        &'a self,
        stack: &'a StackReference,
        key: &'a str,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let path = stack.path();
            self.outputs
                .get(&path)
                .and_then(|outputs| outputs.get(key))
                .cloned()
                .ok_or_else(|| DeployError::ReferenceNotFound {
                    stack: path,
                    key: key.to_string(),
                })
        })
    }
}
