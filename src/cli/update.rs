//! Update project dependencies.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::io::Write;

use super::CliConfig;
use super::common::update_project;

#[derive(Args, Debug)]
pub struct UpdateCommand {}

impl UpdateCommand {
    pub async fn execute(self, config: &CliConfig, out: &mut impl Write) -> Result<()> {
        let project = update_project(&config.project_dir, &config.opa()).await?;
        let count = project.walk().count();
        writeln!(out, "{} Updated {count} dependencies", "✓".green())?;
        Ok(())
    }
}
