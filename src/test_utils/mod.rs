//! Test utilities.
//!
//! Shared fixtures for unit tests and the integration suite: a sample project
//! manifest, fully-populated in-memory reference store, secret source and cloud
//! provider, and [`fixtures::ProjectFixture`] for writing the same project to
//! disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use doc_mgmt_deploy::context::StackName;
//! use doc_mgmt_deploy::test_utils::{fixtures, init_test_logging};
//!
//! # async fn example() {
//! init_test_logging(None);
//! let (deployment, provider) = fixtures::deployment(StackName::Prod);
//! let prepared = deployment.prepare().await.unwrap();
//! assert_eq!(provider.calls(), 1);
//! # let _ = prepared;
//! # }
//! ```

pub mod fixtures;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=doc_mgmt_deploy=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
