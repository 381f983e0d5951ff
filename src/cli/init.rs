//! Initialize a new OPA project.
//!
//! ```bash
//! # In the current directory, with a `src` source directory
//! odm init
//!
//! # In a new ./acme directory, without a source directory
//! odm init acme --no-source
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::io::Write;

use super::CliConfig;
use crate::location::ODM_DIR;
use crate::project::Project;
use crate::utils::fs::ensure_dir;

#[derive(Args, Debug)]
pub struct InitCommand {
    /// Project name; also the directory created under the project directory
    pub name: Option<String>,

    /// Source directory of the project
    #[arg(short, long, default_value = "src", conflicts_with = "no_source")]
    pub source: String,

    /// Don't declare a source directory
    #[arg(long)]
    pub no_source: bool,
}

impl InitCommand {
    pub async fn execute(self, config: &CliConfig, out: &mut impl Write) -> Result<()> {
        let dir = match &self.name {
            Some(name) => config.project_dir.join(name),
            None => config.project_dir.clone(),
        };
        tracing::info!(
            "Initializing OPA project {} in {}",
            self.name.as_deref().unwrap_or_default(),
            dir.display()
        );

        if dir.exists() {
            tracing::debug!("Directory {} already exists, not creating it", dir.display());
        }
        ensure_dir(&dir)?;

        let mut project = Project::new(&dir);
        project.name = self.name.unwrap_or_default();
        if !self.no_source && !self.source.is_empty() {
            project.source_dirs = vec![self.source];
        }

        project.write(false)?;
        ensure_dir(&dir.join(ODM_DIR))?;

        writeln!(out, "{} Initialized {}", "✓".green(), project.manifest_path().display())?;
        Ok(())
    }
}
