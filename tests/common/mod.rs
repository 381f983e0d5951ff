//! Shared helpers for the integration suite.
#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use std::path::PathBuf;

use odm_cli::project::dependencies_dir;
use odm_cli::project::id::dependency_id;
use odm_cli::test_utils::ProjectFixture;
use odm_cli::utils::platform::command_exists;

/// A scratch area holding a project at `project/` next to its local dependencies.
pub struct TestProject {
    fixture: ProjectFixture,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        let fixture = ProjectFixture::new()?.dir("project")?;
        Ok(Self {
            fixture,
        })
    }

    pub fn project_path(&self) -> PathBuf {
        self.fixture.path("project")
    }

    pub fn write_manifest(&self, content: &str) -> Result<()> {
        self.fixture.write("project/opa.project", content)
    }

    /// Writes a file relative to the scratch root, so `lib/x.rego` lands next to `project/`.
    pub fn write_file(&self, relative: &str, content: &str) -> Result<()> {
        self.fixture.write(relative, content)
    }

    pub fn read_file(&self, relative: &str) -> Result<String> {
        self.fixture.read(relative)
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.fixture.path(relative)
    }

    /// Where a direct dependency of the project is materialized.
    pub fn dependency_dir(&self, namespace: &str, location: &str) -> PathBuf {
        dependencies_dir(&self.project_path()).join(dependency_id(namespace, location))
    }

    /// `odm` running inside the project directory with logging at its default.
    pub fn odm(&self) -> Command {
        let mut cmd = Command::cargo_bin("odm").expect("odm binary is built");
        cmd.current_dir(self.project_path())
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }

    /// Same as [`Self::odm`], with `-p` pointing at the absolute project path.
    pub fn odm_at_project(&self) -> Command {
        let mut cmd = self.odm();
        cmd.arg("-p").arg(self.project_path());
        cmd
    }
}

pub fn opa_available() -> bool {
    command_exists(&std::env::var("OPA_PATH").unwrap_or_else(|_| "opa".to_string()))
}
