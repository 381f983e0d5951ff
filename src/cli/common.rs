//! Project plumbing shared by the commands.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::location::ODM_DIR;
use crate::project::{NamespaceRewriter, Project, dependencies_dir};
use crate::utils::fs::{ensure_dir, recreate_dir};

/// Re-fetches every dependency of the project at `project_dir`.
///
/// `.opa/dependencies` is wiped first so dependencies removed from the
/// manifest do not linger.
pub async fn update_project<R: NamespaceRewriter>(project_dir: &Path, rewriter: &R) -> Result<Project> {
    let mut project = Project::read(project_dir, false)?;
    tracing::info!("Updating project '{}'", project.name);

    let dir = project.manifest_dir().to_path_buf();
    ensure_dir(&dir.join(ODM_DIR))?;
    recreate_dir(&dependencies_dir(&dir))?;

    project.update(rewriter).await?;
    Ok(project)
}

/// Reads the project and its already materialized tree. A missing manifest
/// yields an empty project.
pub fn load_project(project_dir: &Path) -> Result<Project> {
    let mut project = Project::read(project_dir, true)?;
    project
        .load()
        .with_context(|| format!("Failed to load project at {}", project_dir.display()))?;
    Ok(project)
}

/// Updates (unless `no_update`) and then loads the project.
pub async fn prepare_project<R: NamespaceRewriter>(
    project_dir: &Path,
    no_update: bool,
    rewriter: &R,
) -> Result<Project> {
    if no_update {
        tracing::debug!("Skipping dependency update");
    } else {
        update_project(project_dir, rewriter).await?;
    }
    load_project(project_dir)
}

pub fn write_paths(out: &mut impl Write, paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        writeln!(out, "{}", path.display())?;
    }
    Ok(())
}
