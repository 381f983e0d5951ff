//! Git operations for fetching remote policy dependencies
//!
//! ODM drives the system `git` binary rather than an embedded library, so
//! existing SSH agents, credential helpers and git configuration apply to
//! dependency fetches unchanged.
//!
//! A git dependency is materialized in two steps:
//!
//! 1. `git clone --progress --recurse-submodules <url> <target>`
//! 2. `git -C <target> checkout refs/tags/<tag>` when the location names a tag
//!
//! Without a tag the clone stays on the remote's default branch.
//!
//! # Examples
//!
//! ```rust,no_run
//! use odm_cli::git::GitRepo;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let repo = GitRepo::clone("https://github.com/acme/policies.git", "/tmp/acme").await?;
//! repo.checkout_tag("v1.2.0").await?;
//! # Ok(())
//! # }
//! ```

pub mod command_builder;

use anyhow::Result;
use std::path::{Path, PathBuf};

use command_builder::GitCommand;

/// Handle to a local clone.
#[derive(Debug, Clone)]
pub struct GitRepo {
    path: PathBuf,
}

impl GitRepo {
    /// Wraps an existing checkout without validating it.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Clones `url` into `target`.
    ///
    /// `target` may already exist as long as it is empty.
    ///
    /// # Errors
    ///
    /// Returns [`crate::core::OdmError::GitCloneFailed`] when git reports a failure and
    /// [`crate::core::OdmError::GitNotFound`] when git cannot be started.
    pub async fn clone(url: &str, target: impl AsRef<Path>) -> Result<Self> {
        let target_path = target.as_ref();
        GitCommand::clone(url, target_path).with_context(url).execute_success().await?;
        Ok(Self::new(target_path))
    }

    /// Checks out `refs/tags/<tag>`, leaving the clone in detached HEAD state.
    pub async fn checkout_tag(&self, tag: &str) -> Result<()> {
        let reference = format!("refs/tags/{tag}");
        GitCommand::checkout(&reference).current_dir(&self.path).execute_success().await
    }

    /// The commit currently checked out.
    pub async fn current_commit(&self) -> Result<String> {
        GitCommand::current_commit().current_dir(&self.path).execute_stdout().await
    }

    /// The local path of this clone.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
