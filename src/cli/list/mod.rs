//! List project resources.

mod source;
mod tree;

use anyhow::Result;
use clap::{Args, Subcommand};
use std::io::Write;

use super::CliConfig;

#[derive(Args, Debug)]
pub struct ListCommand {
    #[command(subcommand)]
    pub command: ListCommands,
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
    /// List the project's source folders
    Source(source::ListSourceCommand),

    /// Show the resolved dependency tree
    Tree(tree::ListTreeCommand),
}

impl ListCommand {
    pub async fn execute(self, config: &CliConfig, out: &mut impl Write) -> Result<()> {
        match self.command {
            ListCommands::Source(cmd) => cmd.execute(config, out).await,
            ListCommands::Tree(cmd) => cmd.execute(config, out).await,
        }
    }
}
