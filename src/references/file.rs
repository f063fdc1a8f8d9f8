//! File-backed reference store.
//!
//! Each infra stack's outputs live in a JSON object at
//! `<root>/<org>/<project>-infra/<stack>.json`, the shape produced by exporting
//! a stack's outputs as JSON. A stack file is read at most once per store; the
//! parsed outputs are shared by every later request.

use super::{ReferenceStore, StackReference};
use crate::core::{DeployError, Result};
use dashmap::DashMap;
use futures::future::BoxFuture;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;

type Outputs = Arc<Map<String, Value>>;

/// Reads exported stack outputs from a directory tree.
#[derive(Debug)]
pub struct FileReferenceStore {
    root: PathBuf,
    stacks: DashMap<String, Arc<OnceCell<Outputs>>>,
}

impl FileReferenceStore {
    /// Store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            stacks: DashMap::new(),
        }
    }

    /// Root directory of the exported outputs.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the outputs file for `stack`.
    #[must_use]
    pub fn stack_file(&self, stack: &StackReference) -> PathBuf {
        self.root
            .join(stack.org())
            .join(stack.infra_project())
            .join(format!("{}.json", stack.stack()))
    }

    async fn outputs(&self, stack: &StackReference, key: &str) -> Result<Outputs> {
        // Clone the cell out so the map shard is not locked across the read.
        let cell = self.stacks.entry(stack.path()).or_default().clone();

        cell.get_or_try_init(|| async {
            let path = self.stack_file(stack);
            tracing::debug!(path = %path.display(), "reading stack outputs");

            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(DeployError::ReferenceNotFound {
                        stack: stack.path(),
                        key: key.to_string(),
                    });
                }
                Err(e) => return Err(e.into()),
            };

            let outputs: Map<String, Value> =
                serde_json::from_str(&content).map_err(|e| DeployError::InvalidConfiguration {
                    key: path.display().to_string(),
                    reason: format!("stack outputs must be a JSON object: {e}"),
                })?;
            Ok(Arc::new(outputs))
        })
        .await
        .cloned()
    }
}

impl ReferenceStore for FileReferenceStore {
    fn get_output<'a>(
        &'a self,
        stack: &'a StackReference,
        key: &'a str,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let outputs = self.outputs(stack, key).await?;
            match outputs.get(key) {
                Some(Value::String(value)) if !value.is_empty() => Ok(value.clone()),
                Some(Value::String(_)) | Some(Value::Null) | None => {
                    Err(DeployError::ReferenceNotFound {
                        stack: stack.path(),
                        key: key.to_string(),
                    })
                }
                Some(other) => Err(DeployError::invalid(
                    format!("{stack}:{key}"),
                    format!("expected a string output, found {other}"),
                )),
            }
        })
    }
}
