//! Library repositories.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::id::repository_id;
use crate::core::OdmError;
use crate::location::Location;
use crate::manifest::{REPOSITORY_MANIFEST, RepositoryManifest};
use crate::utils::fs::recreate_dir;

/// A fetched table of library names, each standing for a location.
///
/// Dependencies whose location is a bare name are resolved against the
/// repositories of the project declaring them.
#[derive(Debug, Clone)]
pub struct Repository {
    pub location: Location,
    libraries: BTreeMap<String, Location>,
    materialized_path: Option<PathBuf>,
}

impl Repository {
    /// An unfetched repository with an empty library table.
    pub fn new(location: Location) -> Self {
        Self {
            location,
            libraries: BTreeMap::new(),
            materialized_path: None,
        }
    }

    /// The content-addressed directory name under a repositories root.
    pub fn id(&self) -> String {
        repository_id(self.location.raw())
    }

    /// Looks up a library by exact name.
    pub fn find(&self, name: &str) -> Option<&Location> {
        self.libraries.get(name)
    }

    pub fn libraries(&self) -> &BTreeMap<String, Location> {
        &self.libraries
    }

    pub fn materialized_path(&self) -> Option<&Path> {
        self.materialized_path.as_deref()
    }

    /// Re-fetches the repository into `repos_root/<id>` and reads its library table.
    ///
    /// # Errors
    ///
    /// - [`OdmError::UnsupportedLocation`] if the repository itself has a bare-name location
    /// - [`OdmError::MissingRepositoryManifest`] if the fetched tree has no `repository.yaml`
    pub async fn update(&mut self, root_dir: &Path, repos_root: &Path) -> Result<()> {
        let target_dir = repos_root.join(self.id());
        tracing::debug!("Updating repository {} in {}", self.location, target_dir.display());

        recreate_dir(&target_dir)?;

        if !self.location.is_supported() {
            return Err(OdmError::UnsupportedLocation {
                location: self.location.raw().to_string(),
            }
            .into());
        }

        self.location.materialize(root_dir, &target_dir).await?;
        self.read_libraries(&target_dir)?;
        self.materialized_path = Some(target_dir);

        tracing::info!(
            "Repository {} provides {} libraries",
            self.location,
            self.libraries.len()
        );
        Ok(())
    }

    /// Reads the library table of an already fetched repository.
    ///
    /// A repository that was never fetched keeps an empty table.
    pub fn load(&mut self, repos_root: &Path) -> Result<()> {
        let target_dir = repos_root.join(self.id());
        if target_dir.join(REPOSITORY_MANIFEST).exists() {
            self.read_libraries(&target_dir)?;
            self.materialized_path = Some(target_dir);
        } else {
            tracing::debug!("Repository {} has not been fetched", self.location);
        }
        Ok(())
    }

    fn read_libraries(&mut self, dir: &Path) -> Result<()> {
        let manifest = RepositoryManifest::load(dir, self.location.raw())?;
        self.libraries = manifest
            .libraries
            .iter()
            .map(|(name, raw)| Ok((name.clone(), Location::parse(raw)?)))
            .collect::<Result<_, OdmError>>()
            .with_context(|| format!("Invalid library location in repository {}", self.location))?;
        Ok(())
    }
}

/// First library named `name` across `repositories`, in declaration order.
pub fn find_library<'a>(repositories: &'a [Repository], name: &str) -> Option<&'a Location> {
    repositories.iter().find_map(|repo| repo.find(name))
}
