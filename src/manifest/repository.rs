//! The `repository.yaml` library table.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::core::OdmError;
use crate::utils::fs::read_yaml_file;

/// File name every repository must carry at its root.
pub const REPOSITORY_MANIFEST: &str = "repository.yaml";

/// Library names mapped to the locations they stand for.
///
/// ```yaml
/// libraries:
///   acme-authz: git+https://github.com/acme/authz.git#v2.0.0
///   acme-common: file:/../common
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryManifest {
    #[serde(default)]
    pub libraries: BTreeMap<String, String>,
}

impl RepositoryManifest {
    /// Reads `repository.yaml` from the root of a materialized repository.
    ///
    /// # Errors
    ///
    /// [`OdmError::MissingRepositoryManifest`] when the file is absent,
    /// [`OdmError::ManifestParseError`] when it cannot be parsed.
    pub fn load(repo_dir: &Path, location: &str) -> Result<Self> {
        let path = repo_dir.join(REPOSITORY_MANIFEST);
        if !path.exists() {
            return Err(OdmError::MissingRepositoryManifest {
                location: location.to_string(),
            }
            .into());
        }

        read_yaml_file(&path)
            .map_err(|e| OdmError::ManifestParseError {
                file: path.display().to_string(),
                reason: format!("{e:#}"),
            })
            .with_context(|| format!("Failed to read library table of repository {location}"))
    }
}
