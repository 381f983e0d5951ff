//! The namespace rewrite seam.

use anyhow::Result;
use std::future::Future;
use std::path::PathBuf;

/// Rewrites policy packages in place.
///
/// After a dependency is materialized, every package under `from` in the
/// given directories is moved under `to` (for example `data` to
/// `data.acme.authz`). The policy engine's refactoring command is the
/// production implementation, see [`crate::opa::Opa`].
pub trait NamespaceRewriter {
    fn rewrite(&self, dirs: &[PathBuf], from: &str, to: &str) -> impl Future<Output = Result<()>>;
}
