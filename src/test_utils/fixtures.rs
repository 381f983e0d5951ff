//! On-disk project layouts for tests.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory populated file by file.
///
/// Paths are relative to the fixture root and parent directories are
/// created as needed. The directory is removed when the fixture is dropped.
pub struct ProjectFixture {
    root: TempDir,
}

impl ProjectFixture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            root: TempDir::new().context("Failed to create fixture directory")?,
        })
    }

    /// Writes `content` to `relative`, builder style.
    pub fn file(self, relative: &str, content: &str) -> Result<Self> {
        self.write(relative, content)?;
        Ok(self)
    }

    /// Writes every `(path, content)` pair.
    pub fn files(self, files: &[(&str, &str)]) -> Result<Self> {
        for (relative, content) in files {
            self.write(relative, content)?;
        }
        Ok(self)
    }

    /// Creates an empty directory.
    pub fn dir(self, relative: &str) -> Result<Self> {
        let path = self.path(relative);
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Ok(self)
    }

    pub fn write(&self, relative: &str, content: &str) -> Result<()> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn read(&self, relative: &str) -> Result<String> {
        let path = self.path(relative);
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }
}
