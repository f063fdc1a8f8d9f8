//! Release engines.
//!
//! The chart release itself (Helm, a GitOps controller, ...) happens outside
//! this crate. A [`ReleaseEngine`] receives the finished descriptor and reports
//! an identifier and status; nothing downstream runs until it has answered.

use super::ReleaseDescriptor;
use crate::context::StackName;
use crate::core::Result;
use futures::future::BoxFuture;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// What the engine reports for an applied release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseOutcome {
    /// Engine-specific release identifier
    pub id: String,
    /// Engine-specific status, e.g. `deployed` or `rendered`
    pub status: String,
    /// Descriptor digest the outcome refers to
    pub revision: String,
}

/// Applies a release descriptor.
pub trait ReleaseEngine: Send + Sync {
    /// Apply `descriptor` and report the result.
    fn apply<'a>(
        &'a self,
        descriptor: &'a ReleaseDescriptor,
    ) -> BoxFuture<'a, Result<ReleaseOutcome>>;
}

/// Writes the descriptor to `<out_dir>/<release>-<stack>.yaml` for an
/// external engine to pick up.
#[derive(Debug, Clone)]
pub struct RenderEngine {
    out_dir: PathBuf,
    stack: StackName,
    redact: bool,
}

impl RenderEngine {
    /// Render into `out_dir` for `stack`, secrets included.
    pub fn new(out_dir: impl Into<PathBuf>, stack: StackName) -> Self {
        Self {
            out_dir: out_dir.into(),
            stack,
            redact: false,
        }
    }

    /// Replace secrets with placeholders in the written file.
    #[must_use]
    pub fn redacting(mut self, redact: bool) -> Self {
        self.redact = redact;
        self
    }

    /// Directory files are written to.
    #[must_use]
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// File the descriptor for `release` is written to.
    #[must_use]
    pub fn target_path(&self, release: &str) -> PathBuf {
        self.out_dir.join(format!("{release}-{}.yaml", self.stack))
    }
}

impl ReleaseEngine for RenderEngine {
    fn apply<'a>(
        &'a self,
        descriptor: &'a ReleaseDescriptor,
    ) -> BoxFuture<'a, Result<ReleaseOutcome>> {
        Box::pin(async move {
            let revision = descriptor.digest()?;
            let body = if self.redact {
                descriptor.redacted().to_yaml()?
            } else {
                descriptor.to_yaml()?
            };

            fs::create_dir_all(&self.out_dir).await?;
            let path = self.target_path(&descriptor.name);
            fs::write(&path, body).await?;

            tracing::info!(path = %path.display(), %revision, "rendered release descriptor");

            Ok(ReleaseOutcome {
                id: format!("{}/{}", descriptor.namespace, descriptor.name),
                status: "rendered".to_string(),
                revision,
            })
        })
    }
}
