//! Typed dependency locations
//!
//! A location string from a manifest is parsed once, when the manifest is
//! loaded, into one of three shapes:
//!
//! | Prefix            | Variant                  | Materialized by            |
//! |-------------------|--------------------------|----------------------------|
//! | `file:`           | [`Location::Local`]      | filtered directory copy    |
//! | `git:` / `git+`   | [`Location::Git`]        | `git clone` + tag checkout |
//! | anything else     | [`Location::Unresolved`] | a repository library entry |
//!
//! The raw string is kept verbatim on every variant: it is what the manifest
//! round-trips, what dependency directory hashes are computed from, and the
//! key used for repository library lookups.
//!
//! # Local paths
//!
//! | Raw                   | Path           |
//! |-----------------------|----------------|
//! | `file:policies`       | `policies`     |
//! | `file:/../shared`     | `../shared`    |
//! | `file:/../my%20lib`   | `../my lib`    |
//! | `file:///opt/shared`  | `opt/shared`   |
//! | `file://opt/shared`   | `/opt/shared`  |
//!
//! Only a host makes a path absolute: it becomes the first segment. Paths are
//! percent-decoded and any query or fragment is dropped. Relative paths are
//! resolved against the root project's directory at materialization time.

use anyhow::{Context, Result};
use percent_encoding::percent_decode_str;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::OdmError;
use crate::git::GitRepo;
use crate::utils::fs::{copy_dir_filtered, normalize_path};

/// Name of the project manifest file.
pub const PROJECT_MANIFEST: &str = "opa.project";

/// Directory excluded from local copies; it holds a project's own materialized dependencies.
pub const ODM_DIR: &str = ".opa";

/// The broad category a location falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    Local,
    Git,
    Unresolved,
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Git => write!(f, "git"),
            Self::Unresolved => write!(f, "unknown"),
        }
    }
}

/// Where a dependency's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A directory (or `opa.project` file) on the local file system.
    Local {
        raw: String,
        path: PathBuf,
    },
    /// A git repository, optionally pinned to a tag.
    Git {
        raw: String,
        url: String,
        tag: Option<String>,
    },
    /// A bare name, resolvable only through a repository's library table.
    Unresolved(String),
}

impl Location {
    /// Parses a raw location string.
    ///
    /// # Errors
    ///
    /// [`OdmError::MalformedLocation`] for a git location with more than one
    /// `#` tag separator, or a `file:` path that does not decode to UTF-8.
    pub fn parse(raw: &str) -> Result<Self, OdmError> {
        if raw.starts_with("file:") {
            return Ok(Self::Local {
                raw: raw.to_string(),
                path: file_uri_path(raw)?,
            });
        }

        if raw.starts_with("git:") || raw.starts_with("git+") {
            let (url, tag) = split_git_location(raw)?;
            return Ok(Self::Git {
                raw: raw.to_string(),
                url,
                tag,
            });
        }

        Ok(Self::Unresolved(raw.to_string()))
    }

    /// The location exactly as declared.
    pub fn raw(&self) -> &str {
        match self {
            Self::Local {
                raw,
                ..
            }
            | Self::Git {
                raw,
                ..
            }
            | Self::Unresolved(raw) => raw,
        }
    }

    pub const fn kind(&self) -> LocationKind {
        match self {
            Self::Local {
                ..
            } => LocationKind::Local,
            Self::Git {
                ..
            } => LocationKind::Git,
            Self::Unresolved(_) => LocationKind::Unresolved,
        }
    }

    /// Whether this location can be materialized without a repository lookup.
    pub const fn is_supported(&self) -> bool {
        !matches!(self, Self::Unresolved(_))
    }

    /// Fetches or copies this location's content into `target_dir`.
    ///
    /// `root_dir` is the directory relative local paths resolve against.
    /// `target_dir` is expected to exist and be empty.
    ///
    /// # Errors
    ///
    /// - [`OdmError::SourceNotFound`] when a local path does not exist
    /// - [`OdmError::UnsupportedLocation`] for an unresolved location
    /// - git failures from [`GitRepo`]
    pub async fn materialize(&self, root_dir: &Path, target_dir: &Path) -> Result<()> {
        match self {
            Self::Local {
                path,
                ..
            } => materialize_local(path, root_dir, target_dir).await,
            Self::Git {
                url,
                tag,
                ..
            } => materialize_git(url, tag.as_deref(), target_dir).await,
            Self::Unresolved(raw) => Err(OdmError::UnsupportedLocation {
                location: raw.clone(),
            }
            .into()),
        }
    }
}

impl FromStr for Location {
    type Err = OdmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw())
    }
}

/// Converts a `file:` URI into a file system path.
fn file_uri_path(raw: &str) -> Result<PathBuf, OdmError> {
    let rest = raw.strip_prefix("file:").unwrap_or(raw);
    let rest = rest.split(['?', '#']).next().unwrap_or_default();

    let (host, path) = match rest.strip_prefix("//") {
        Some(authority) => authority.split_at(authority.find('/').unwrap_or(authority.len())),
        None => ("", rest),
    };

    let path = percent_decode_str(path).decode_utf8().map_err(|_| OdmError::MalformedLocation {
        location: raw.to_string(),
        reason: "path is not valid UTF-8 after percent-decoding".to_string(),
    })?;

    if host.is_empty() {
        return Ok(PathBuf::from(path.strip_prefix('/').unwrap_or(&*path)));
    }
    Ok(PathBuf::from(format!("/{host}{path}")))
}

/// Splits `git+<url>#<tag>` into the clone URL and the optional tag.
fn split_git_location(raw: &str) -> Result<(String, Option<String>), OdmError> {
    let trimmed = raw.strip_prefix("git+").unwrap_or(raw);
    let mut parts = trimmed.split('#');
    let url = parts.next().unwrap_or_default().to_string();
    let tag = parts.next().filter(|t| !t.is_empty()).map(str::to_string);

    if parts.next().is_some() {
        return Err(OdmError::MalformedLocation {
            location: raw.to_string(),
            reason: "only one tag separator '#' allowed".to_string(),
        });
    }

    Ok((url, tag))
}

async fn materialize_local(path: &Path, root_dir: &Path, target_dir: &Path) -> Result<()> {
    let mut source = if path.is_absolute() {
        path.to_path_buf()
    } else {
        normalize_path(&root_dir.join(path))
    };

    if !source.exists() {
        return Err(OdmError::SourceNotFound {
            path: source.display().to_string(),
        }
        .into());
    }

    if source.is_file()
        && source.file_name().is_some_and(|name| name == PROJECT_MANIFEST)
        && let Some(parent) = source.parent()
    {
        source = parent.to_path_buf();
    }

    tracing::debug!("Copying {} to {}", source.display(), target_dir.display());

    let target = target_dir.to_path_buf();
    let from = source.clone();
    let dispatch = tracing::dispatcher::get_default(Clone::clone);
    // Zero-length modules are skipped: the namespace rewrite rejects files without a package
    tokio::task::spawn_blocking(move || {
        tracing::dispatcher::with_default(&dispatch, || {
            copy_dir_filtered(&from, &target, &[ODM_DIR], true)
        })
    })
    .await
    .context("File copy task panicked")?
    .with_context(|| format!("Failed to copy {}", source.display()))
}

async fn materialize_git(url: &str, tag: Option<&str>, target_dir: &Path) -> Result<()> {
    let repo = GitRepo::clone(url, target_dir).await?;

    match tag {
        Some(tag) => repo.checkout_tag(tag).await?,
        None => tracing::debug!("No tag specified for {url}, using HEAD"),
    }

    let commit = repo.current_commit().await?;
    tracing::debug!("Checked out {url} at {commit}");
    Ok(())
}
