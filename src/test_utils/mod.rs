//! Test utilities for ODM
//!
//! Helpers shared by unit tests and the integration suite (via the
//! `test-utils` feature):
//!
//! - [`init_test_logging`] to see `tracing` output from a failing test
//! - [`ProjectFixture`] to lay out projects and dependencies in a temp dir
//! - [`RegoPackageRewriter`], an in-process [`crate::project::NamespaceRewriter`]
//!   so resolution can be tested without the `opa` binary
//! - [`TestGit`] for building throwaway git repositories
//!
//! # Example
//!
//! ```rust,no_run
//! use odm_cli::test_utils::{ProjectFixture, RegoPackageRewriter};
//! use odm_cli::project::Project;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let fixture = ProjectFixture::new()?
//!     .file("app/opa.project", "dependencies:\n  lib: file:/../lib\n")?
//!     .file("lib/lib.rego", "package lib\n")?;
//!
//! let mut project = Project::read(&fixture.path("app"), false)?;
//! project.update(&RegoPackageRewriter::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod fixtures;
pub mod git_helper;
pub mod rewriter;

pub use fixtures::ProjectFixture;
pub use git_helper::TestGit;
pub use rewriter::RegoPackageRewriter;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Installs a test-writer subscriber at most once per process. Uses `level`
/// when given, else `RUST_LOG` when set, else stays silent.
///
/// ```bash
/// RUST_LOG=debug cargo test
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
            .try_init();
    });
}
