//! Reading and writing `opa.project` files.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::ProjectManifest;
use crate::core::OdmError;
use crate::location::PROJECT_MANIFEST;
use crate::utils::fs::{read_text_file, write_yaml_file};

/// Resolves a project path to its manifest file.
///
/// A path whose file name is already `opa.project` is returned unchanged;
/// anything else is treated as the project directory.
pub fn manifest_file_path(path: &Path) -> PathBuf {
    if path.file_name().is_some_and(|name| name == PROJECT_MANIFEST) {
        path.to_path_buf()
    } else {
        path.join(PROJECT_MANIFEST)
    }
}

/// Loads and parses the manifest at `path`.
///
/// # Errors
///
/// - [`OdmError::ManifestNotFound`] if the file does not exist
/// - [`OdmError::ManifestParseError`] if it is not a valid manifest
pub fn load_project_manifest(path: &Path) -> Result<ProjectManifest> {
    if !path.exists() {
        return Err(OdmError::ManifestNotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    let content = read_text_file(path)?;

    // An empty file is a manifest with every field at its default
    if content.trim().is_empty() {
        return Ok(ProjectManifest::default());
    }

    serde_yaml::from_str(&content)
        .map_err(|e| OdmError::ManifestParseError {
            file: path.display().to_string(),
            reason: e.to_string(),
        })
        .with_context(|| format!("Failed to load project manifest {}", path.display()))
}

/// Serializes `manifest` and writes it atomically to `path`.
pub fn save_project_manifest(path: &Path, manifest: &ProjectManifest) -> Result<()> {
    tracing::debug!("Writing project manifest {}", path.display());
    write_yaml_file(path, manifest)
        .with_context(|| format!("Failed to save project manifest {}", path.display()))
}
