//! A single edge of the dependency graph.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::id::dependency_id;
use super::namespace::compose;
use super::repository::{Repository, find_library};
use super::rewrite::NamespaceRewriter;
use super::{Project, dependencies_dir, repositories_dir};
use crate::core::OdmError;
use crate::location::{Location, ODM_DIR, PROJECT_MANIFEST};
use crate::utils::fs::{filter_existing, recreate_dir};

/// A named dependency and, once resolved, the project it contains.
#[derive(Debug, Clone)]
pub struct Dependency {
    pub name: String,
    pub location: Location,
    /// Own namespace; empty means the dependency is not namespaced.
    pub namespace: String,
    /// Own namespaces of the enclosing dependencies, outermost first.
    ancestry: Vec<String>,
    /// The dependency's own manifest, if it has one.
    pub project: Option<Box<Project>>,
    materialized_path: Option<PathBuf>,
}

impl Dependency {
    pub fn new(name: impl Into<String>, location: Location, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location,
            namespace: namespace.into(),
            ancestry: Vec::new(),
            project: None,
            materialized_path: None,
        }
    }

    /// The namespace this dependency's policies are moved under.
    ///
    /// Recomputed on every call from the ancestry recorded during the last
    /// update or load.
    pub fn full_namespace(&self) -> String {
        compose(&self.ancestry, &self.namespace)
    }

    /// Content-addressed directory name.
    pub fn id(&self) -> String {
        dependency_id(&self.full_namespace(), self.location.raw())
    }

    pub fn ancestry(&self) -> &[String] {
        &self.ancestry
    }

    pub(crate) fn set_ancestry(&mut self, ancestry: Vec<String>) {
        self.ancestry = ancestry;
    }

    /// Where the content was materialized; `None` before update or load.
    pub fn materialized_path(&self) -> Option<&Path> {
        self.materialized_path.as_deref()
    }

    fn require_materialized(&self) -> Result<&Path, OdmError> {
        self.materialized_path().ok_or_else(|| OdmError::DependencyNotMaterialized {
            name: self.name.clone(),
        })
    }

    /// Declared source directories, or the materialized root if none are declared.
    pub fn source_dirs(&self) -> Result<Vec<PathBuf>, OdmError> {
        let root = self.require_materialized()?;
        match &self.project {
            Some(project) if !project.source_dirs.is_empty() => {
                Ok(project.source_dirs.iter().map(|dir| root.join(dir)).collect())
            }
            _ => Ok(vec![root.to_path_buf()]),
        }
    }

    /// Declared test directories; empty if none are declared.
    pub fn test_dirs(&self) -> Result<Vec<PathBuf>, OdmError> {
        let root = self.require_materialized()?;
        Ok(self
            .project
            .as_ref()
            .map(|project| project.test_dirs.iter().map(|dir| root.join(dir)).collect())
            .unwrap_or_default())
    }

    fn child_ancestry(&self) -> Vec<String> {
        let mut ancestry = self.ancestry.clone();
        ancestry.push(self.namespace.clone());
        ancestry
    }

    /// Re-fetches this dependency and everything beneath it.
    ///
    /// The target directory `deps_root/<id>` is wiped first. A bare-name
    /// location is looked up in `repositories`, the repositories of the
    /// declaring project. Nested dependencies are fetched into the target's
    /// own `.opa/dependencies` and namespaced before this dependency's own
    /// policies are rewritten.
    pub async fn update<R: NamespaceRewriter>(
        &mut self,
        repositories: &[Repository],
        root_dir: &Path,
        deps_root: &Path,
        rewriter: &R,
    ) -> Result<()> {
        let target_dir = deps_root.join(self.id());
        tracing::debug!(
            "Updating dependency {} ({}) into {}",
            self.name,
            self.location,
            target_dir.display()
        );

        recreate_dir(&target_dir)?;

        let location = if self.location.is_supported() {
            &self.location
        } else {
            let resolved = find_library(repositories, self.location.raw()).ok_or_else(|| {
                OdmError::UnsupportedLocation {
                    location: self.location.raw().to_string(),
                }
            })?;
            tracing::debug!("Resolved library {} to {}", self.location, resolved);
            resolved
        };

        location.materialize(root_dir, &target_dir).await?;

        self.project = read_nested_project(&target_dir)?;
        self.materialized_path = Some(target_dir.clone());

        let child_ancestry = self.child_ancestry();
        if let Some(project) = self.project.as_mut() {
            project
                .update_tree(
                    root_dir,
                    &dependencies_dir(&target_dir),
                    &repositories_dir(&target_dir),
                    &child_ancestry,
                    rewriter,
                )
                .await?;
        }

        self.rewrite_namespace(rewriter).await
    }

    /// Rebuilds the in-memory tree from what a previous update left on disk.
    ///
    /// Nothing is fetched or rewritten. A dependency that was never
    /// materialized still gets its path but no nested project.
    pub fn load(&mut self, deps_root: &Path) -> Result<()> {
        let target_dir = deps_root.join(self.id());
        if !target_dir.exists() {
            tracing::debug!(
                "Dependency {} has not been materialized at {}",
                self.name,
                target_dir.display()
            );
        }

        self.project = read_nested_project(&target_dir)?;
        self.materialized_path = Some(target_dir.clone());

        let child_ancestry = self.child_ancestry();
        if let Some(project) = self.project.as_mut() {
            project.load_tree(
                &dependencies_dir(&target_dir),
                &repositories_dir(&target_dir),
                &child_ancestry,
            )?;
        }
        Ok(())
    }

    async fn rewrite_namespace<R: NamespaceRewriter>(&self, rewriter: &R) -> Result<()> {
        let namespace = self.full_namespace();
        if namespace.is_empty() {
            return Ok(());
        }

        let mut dirs = self.own_content()?;
        dirs.extend(self.test_dirs()?);
        let dirs = filter_existing(dirs);

        if dirs.is_empty() {
            tracing::debug!("Dependency {} has no source, skipping namespace rewrite", self.name);
            return Ok(());
        }

        tracing::debug!("Moving dependency {} under data.{}", self.name, namespace);
        rewriter
            .rewrite(&dirs, "data", &format!("data.{namespace}"))
            .await
            .with_context(|| format!("Failed to rewrite namespace {namespace} of dependency '{}'", self.name))
    }

    /// Paths holding this dependency's own policies.
    ///
    /// Without declared source directories that is every top-level entry of
    /// the materialized root except the manifest and `.opa`, which holds
    /// nested dependencies that were already namespaced.
    fn own_content(&self) -> Result<Vec<PathBuf>> {
        let root = self.require_materialized()?;
        if self.project.as_ref().is_some_and(|p| !p.source_dirs.is_empty()) {
            return Ok(self.source_dirs()?);
        }

        let mut entries = std::fs::read_dir(root)
            .with_context(|| format!("Failed to list {}", root.display()))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()
            .with_context(|| format!("Failed to list {}", root.display()))?;
        entries.retain(|path| {
            path.file_name().is_none_or(|name| name != ODM_DIR && name != PROJECT_MANIFEST)
        });
        entries.sort();
        Ok(entries)
    }
}

fn read_nested_project(target_dir: &Path) -> Result<Option<Box<Project>>> {
    let manifest = target_dir.join(PROJECT_MANIFEST);
    if !manifest.exists() {
        return Ok(None);
    }
    Ok(Some(Box::new(Project::read(&manifest, false)?)))
}
