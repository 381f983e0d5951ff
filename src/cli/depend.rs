//! Add a dependency to the project.
//!
//! Supported locations:
//! - Git repository: `git+https://...`, `git+ssh://...`, optionally `#<tag>`
//! - Local directory or manifest: `file:/../path` (relative), `file://opt/path` (absolute `/opt/path`)
//! - A library name listed by one of the project's repositories
//!
//! Without `-n` or `-N` the dependency is not namespaced.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::io::Write;

use super::CliConfig;
use crate::location::Location;
use crate::project::Project;

#[derive(Args, Debug)]
pub struct DependCommand {
    /// Dependency name
    pub name: String,

    /// Where the dependency is fetched from
    pub location: String,

    /// Use the dependency name as namespace. Ignored if --namespace is set
    #[arg(short = 'n', long)]
    pub namespaced: bool,

    /// Namespace of the dependency
    #[arg(short = 'N', long)]
    pub namespace: Option<String>,
}

impl DependCommand {
    /// The namespace the flags select; empty for none.
    pub fn effective_namespace(&self) -> String {
        match &self.namespace {
            Some(namespace) if !namespace.is_empty() => namespace.clone(),
            _ if self.namespaced => self.name.clone(),
            _ => String::new(),
        }
    }

    pub async fn execute(self, config: &CliConfig, out: &mut impl Write) -> Result<()> {
        tracing::info!("Setting dependency '{}' @ '{}'", self.name, self.location);

        let location = Location::parse(&self.location)?;
        let namespace = self.effective_namespace();

        let mut project = Project::read(&config.project_dir, true)?;
        project.set_dependency(&self.name, location, &namespace);
        project.write(true)?;

        if namespace.is_empty() {
            writeln!(out, "{} Added dependency {}", "✓".green(), self.name)?;
        } else {
            writeln!(out, "{} Added dependency {} under data.{namespace}", "✓".green(), self.name)?;
        }
        Ok(())
    }
}
