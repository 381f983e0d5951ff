//! Evaluate a Rego query using OPA.
//!
//! `odm eval -- -f pretty "data.main.allow"` runs
//! `opa eval -d <location>... -f pretty "data.main.allow"` with every data
//! location of the project, dependencies included.

use anyhow::Result;
use clap::Args;
use std::io::Write;

use super::CliConfig;
use super::common::prepare_project;

#[derive(Args, Debug)]
pub struct EvalCommand {
    /// Don't update dependencies before evaluating
    #[arg(long)]
    pub no_update: bool,

    /// Flags passed through to `opa eval`
    #[arg(last = true)]
    pub opa_args: Vec<String>,
}

impl EvalCommand {
    pub async fn execute(self, config: &CliConfig, out: &mut impl Write) -> Result<()> {
        let opa = config.opa();
        let project = prepare_project(&config.project_dir, self.no_update, &opa).await?;

        let opa = opa.with_data_locations(project.data_locations()?);
        let output = opa.eval(&self.opa_args).await?;
        write!(out, "{output}")?;
        Ok(())
    }
}
