use anyhow::Result;
use clap::Args;
use std::io::Write;

use crate::cli::CliConfig;
use crate::cli::common::{prepare_project, write_paths};
use crate::project::Project;

#[derive(Args, Debug)]
pub struct ListSourceCommand {
    /// Don't update dependencies before listing
    #[arg(long)]
    pub no_update: bool,

    /// Include test directories in the list
    #[arg(short = 't', long)]
    pub include_test_dirs: bool,

    /// Include dependency tests
    #[arg(long)]
    pub include_dep_tests: bool,
}

impl ListSourceCommand {
    pub async fn execute(self, config: &CliConfig, out: &mut impl Write) -> Result<()> {
        let project = prepare_project(&config.project_dir, self.no_update, &config.opa()).await?;
        self.write(&project, out)
    }

    fn write(&self, project: &Project, out: &mut impl Write) -> Result<()> {
        let mut locations = project.data_locations()?;
        if self.include_test_dirs {
            locations.extend(project.test_locations(self.include_dep_tests)?);
        }
        write_paths(out, &locations)
    }
}
