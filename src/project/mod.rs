//! The dependency resolution engine.
//!
//! A [`Project`] is the in-memory form of an `opa.project` manifest: its own
//! source and test directories, its [`Repository`] list and a map of named
//! [`Dependency`] entries. Dependencies that carry their own manifest own a
//! nested `Project`, so the whole graph is a tree rooted at the project the
//! CLI was pointed at.
//!
//! # Update and load
//!
//! [`Project::update`] rebuilds the tree on disk: repositories first, then
//! every dependency depth-first. Each dependency is wiped, materialized,
//! recursed into, and finally has its policies moved under its effective
//! namespace. [`Project::load`] rebuilds the same in-memory tree from what an
//! earlier update left on disk, without touching the file system.
//!
//! # Layout
//!
//! ```text
//! <project>/
//! ├── opa.project
//! └── .opa/
//!     ├── repositories/<sha256(location)>/repository.yaml
//!     └── dependencies/<sha256(namespace:location)>/
//!         ├── opa.project
//!         └── .opa/dependencies/<sha256(...)>/...
//! ```
//!
//! Relative `file:` locations anywhere in the tree resolve against the root
//! project's directory.

pub mod dependency;
pub mod id;
pub mod namespace;
pub mod repository;
pub mod rewrite;
pub mod walker;

#[cfg(test)]
mod tests;

pub use dependency::Dependency;
pub use repository::Repository;
pub use rewrite::NamespaceRewriter;
pub use walker::{DependencyWalk, write_tree};

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::OdmError;
use crate::location::{Location, ODM_DIR};
use crate::manifest::{
    BuildConfig, DependencySpec, ProjectManifest, load_project_manifest, manifest_file_path,
    save_project_manifest,
};
use crate::utils::fs::filter_existing;

pub const DEPENDENCIES_DIR: &str = "dependencies";
pub const REPOSITORIES_DIR: &str = "repositories";

/// `<dir>/.opa/dependencies`
pub fn dependencies_dir(dir: &Path) -> PathBuf {
    dir.join(ODM_DIR).join(DEPENDENCIES_DIR)
}

/// `<dir>/.opa/repositories`
pub fn repositories_dir(dir: &Path) -> PathBuf {
    dir.join(ODM_DIR).join(REPOSITORIES_DIR)
}

/// A policy project and its resolved dependency tree.
#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    pub version: String,
    /// Source directories relative to the manifest directory.
    pub source_dirs: Vec<String>,
    /// Test directories relative to the manifest directory.
    pub test_dirs: Vec<String>,
    pub dependencies: BTreeMap<String, Dependency>,
    pub repositories: Vec<Repository>,
    pub build: BuildConfig,
    manifest_dir: PathBuf,
}

impl Project {
    /// An empty project rooted at `manifest_dir`.
    pub fn new(manifest_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: String::new(),
            version: String::new(),
            source_dirs: Vec::new(),
            test_dirs: Vec::new(),
            dependencies: BTreeMap::new(),
            repositories: Vec::new(),
            build: BuildConfig::default(),
            manifest_dir: manifest_dir.into(),
        }
    }

    /// Reads the manifest at `path` (a project directory or an `opa.project` file).
    ///
    /// With `allow_missing`, a missing manifest yields an empty project
    /// instead of [`OdmError::ManifestNotFound`].
    pub fn read(path: &Path, allow_missing: bool) -> Result<Self> {
        let manifest_path = manifest_file_path(path);
        let manifest_dir = manifest_path.parent().map(Path::to_path_buf).unwrap_or_default();

        if allow_missing && !manifest_path.exists() {
            tracing::debug!("No manifest at {}, starting empty", manifest_path.display());
            return Ok(Self::new(manifest_dir));
        }

        let manifest = load_project_manifest(&manifest_path)?;
        Self::from_manifest(manifest, manifest_dir)
            .with_context(|| format!("Invalid project manifest {}", manifest_path.display()))
    }

    /// Builds a project from its serialized form, parsing every location.
    ///
    /// # Errors
    ///
    /// [`OdmError::MalformedLocation`] for an unparseable location.
    pub fn from_manifest(manifest: ProjectManifest, manifest_dir: impl Into<PathBuf>) -> Result<Self> {
        let dependencies = manifest
            .dependencies
            .iter()
            .map(|(name, spec)| {
                let location = Location::parse(spec.location())?;
                Ok((name.clone(), Dependency::new(name, location, spec.namespace(name))))
            })
            .collect::<Result<BTreeMap<_, _>, OdmError>>()?;

        let repositories = manifest
            .repositories
            .iter()
            .map(|raw| Location::parse(raw).map(Repository::new))
            .collect::<Result<Vec<_>, OdmError>>()?;

        Ok(Self {
            name: manifest.name,
            version: manifest.version,
            source_dirs: manifest.source,
            test_dirs: manifest.test,
            dependencies,
            repositories,
            build: manifest.build,
            manifest_dir: manifest_dir.into(),
        })
    }

    /// The serialized form of this project.
    pub fn to_manifest(&self) -> ProjectManifest {
        ProjectManifest {
            name: self.name.clone(),
            version: self.version.clone(),
            source: self.source_dirs.clone(),
            test: self.test_dirs.clone(),
            dependencies: self
                .dependencies
                .iter()
                .map(|(name, dep)| {
                    (name.clone(), DependencySpec::new(name, dep.location.raw(), &dep.namespace))
                })
                .collect(),
            repositories: self.repositories.iter().map(|r| r.location.raw().to_string()).collect(),
            build: self.build.clone(),
        }
    }

    /// Writes the manifest to `<manifest_dir>/opa.project`.
    ///
    /// # Errors
    ///
    /// [`OdmError::ManifestAlreadyExists`] if a manifest exists and `overwrite` is false.
    pub fn write(&self, overwrite: bool) -> Result<()> {
        let path = self.manifest_path();
        if !overwrite && path.exists() {
            return Err(OdmError::ManifestAlreadyExists {
                path: path.display().to_string(),
            }
            .into());
        }
        save_project_manifest(&path, &self.to_manifest())
    }

    /// Adds or replaces a dependency.
    pub fn set_dependency(&mut self, name: &str, location: Location, namespace: &str) {
        self.dependencies.insert(name.to_string(), Dependency::new(name, location, namespace));
    }

    /// The directory holding the manifest; relative paths resolve against it.
    pub fn manifest_dir(&self) -> &Path {
        &self.manifest_dir
    }

    pub fn manifest_path(&self) -> PathBuf {
        manifest_file_path(&self.manifest_dir)
    }

    /// Re-fetches every repository and dependency, recursively.
    pub async fn update<R: NamespaceRewriter>(&mut self, rewriter: &R) -> Result<()> {
        let root_dir = self.manifest_dir.clone();
        tracing::info!("Updating dependencies of {}", root_dir.display());
        self.update_tree(
            &root_dir,
            &dependencies_dir(&root_dir),
            &repositories_dir(&root_dir),
            &[],
            rewriter,
        )
        .await
    }

    pub(crate) async fn update_tree<R: NamespaceRewriter>(
        &mut self,
        root_dir: &Path,
        deps_root: &Path,
        repos_root: &Path,
        ancestry: &[String],
        rewriter: &R,
    ) -> Result<()> {
        for repository in &mut self.repositories {
            repository
                .update(root_dir, repos_root)
                .await
                .with_context(|| format!("Failed to update repository '{}'", repository.location))?;
        }

        let repositories = &self.repositories;
        for (name, dependency) in &mut self.dependencies {
            dependency.set_ancestry(ancestry.to_vec());
            Box::pin(dependency.update(repositories, root_dir, deps_root, rewriter))
                .await
                .with_context(|| format!("Failed to update dependency '{name}'"))?;
        }
        Ok(())
    }

    /// Rebuilds the dependency tree from disk without fetching anything.
    pub fn load(&mut self) -> Result<()> {
        let root_dir = self.manifest_dir.clone();
        self.load_tree(&dependencies_dir(&root_dir), &repositories_dir(&root_dir), &[])
    }

    pub(crate) fn load_tree(
        &mut self,
        deps_root: &Path,
        repos_root: &Path,
        ancestry: &[String],
    ) -> Result<()> {
        for repository in &mut self.repositories {
            repository
                .load(repos_root)
                .with_context(|| format!("Failed to load repository '{}'", repository.location))?;
        }

        for (name, dependency) in &mut self.dependencies {
            dependency.set_ancestry(ancestry.to_vec());
            dependency
                .load(deps_root)
                .with_context(|| format!("Failed to load dependency '{name}'"))?;
        }
        Ok(())
    }

    /// Every dependency below this project, depth-first.
    pub fn walk(&self) -> DependencyWalk<'_> {
        DependencyWalk::new(self)
    }

    fn own_dirs(&self, dirs: &[String]) -> Vec<PathBuf> {
        dirs.iter().map(|dir| self.manifest_dir.join(dir)).collect()
    }

    /// Directories to load as policy data.
    ///
    /// The project's own source directories (or the project directory when
    /// none are declared) come first, followed by the source directories of
    /// every dependency in the tree. Paths that do not exist are dropped.
    pub fn data_locations(&self) -> Result<Vec<PathBuf>> {
        let mut locations = if self.source_dirs.is_empty() {
            vec![self.manifest_dir.clone()]
        } else {
            self.own_dirs(&self.source_dirs)
        };

        for (_, dependency) in self.walk() {
            locations.extend(dependency.source_dirs()?);
        }

        Ok(filter_existing(locations))
    }

    /// Directories holding policy tests.
    ///
    /// Dependency test directories are only included with `include_dependencies`.
    /// Unlike [`Self::data_locations`], paths are not checked for existence.
    pub fn test_locations(&self, include_dependencies: bool) -> Result<Vec<PathBuf>> {
        let mut locations = self.own_dirs(&self.test_dirs);

        if include_dependencies {
            for (_, dependency) in self.walk() {
                locations.extend(dependency.test_dirs()?);
            }
        }

        Ok(locations)
    }
}
