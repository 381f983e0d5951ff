use anyhow::Result;
use clap::Args;
use std::io::Write;

use crate::cli::CliConfig;
use crate::cli::common::prepare_project;
use crate::project::write_tree;

#[derive(Args, Debug)]
pub struct ListTreeCommand {
    /// Don't update dependencies before listing
    #[arg(long)]
    pub no_update: bool,
}

impl ListTreeCommand {
    pub async fn execute(self, config: &CliConfig, out: &mut impl Write) -> Result<()> {
        let project = prepare_project(&config.project_dir, self.no_update, &config.opa()).await?;
        write_tree(&project, out)?;
        Ok(())
    }
}
