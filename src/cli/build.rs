//! Build an OPA bundle.
//!
//! The bundle is written to `build.output` from the manifest, relative to the
//! project directory:
//!
//! | `build.output`      | Bundle path              |
//! |---------------------|--------------------------|
//! | unset               | `build/bundle.tar.gz`    |
//! | `dist/`             | `dist/bundle.tar.gz`     |
//! | `dist/policy.tar.gz`| `dist/policy.tar.gz`     |
//! | `policy.tar.gz`     | `policy.tar.gz`          |

use anyhow::{Context, Result};
use clap::Args;
use std::io::Write;
use std::path::PathBuf;

use super::CliConfig;
use super::common::prepare_project;
use crate::utils::fs::ensure_dir;

pub const DEFAULT_BUILD_DIR: &str = "build";
pub const DEFAULT_BUNDLE_FILE: &str = "bundle.tar.gz";

#[derive(Args, Debug)]
pub struct BuildCommand {
    /// Don't update dependencies before building
    #[arg(long)]
    pub no_update: bool,

    /// Flags passed through to `opa build`
    #[arg(last = true)]
    pub opa_args: Vec<String>,
}

/// Splits the configured output into the directory to create and the bundle path.
pub fn bundle_path(output: Option<&str>) -> (Option<PathBuf>, PathBuf) {
    let output = output.unwrap_or_default();
    if output.is_empty() {
        let dir = PathBuf::from(DEFAULT_BUILD_DIR);
        return (Some(dir.clone()), dir.join(DEFAULT_BUNDLE_FILE));
    }

    if output.ends_with('/') || output.ends_with(std::path::MAIN_SEPARATOR) {
        let dir = PathBuf::from(output.trim_end_matches(['/', std::path::MAIN_SEPARATOR]));
        return (Some(dir.clone()), dir.join(DEFAULT_BUNDLE_FILE));
    }

    let path = PathBuf::from(output);
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).map(PathBuf::from);
    (dir, path)
}

impl BuildCommand {
    pub async fn execute(self, config: &CliConfig, out: &mut impl Write) -> Result<()> {
        let opa = config.opa();
        let project = prepare_project(&config.project_dir, self.no_update, &opa).await?;

        let (dir, bundle) = bundle_path(project.build.output.as_deref());
        if let Some(dir) = dir {
            let dir = project.manifest_dir().join(dir);
            ensure_dir(&dir).with_context(|| format!("Failed to create build directory {}", dir.display()))?;
        }
        let bundle = project.manifest_dir().join(bundle);

        let output = opa
            .with_data_locations(project.data_locations()?)
            .with_entrypoints(project.build.entrypoints.clone())
            .with_target(project.build.target.clone())
            .build(&bundle, &self.opa_args)
            .await?;

        tracing::info!("Bundle written to {}", bundle.display());
        write!(out, "{output}")?;
        Ok(())
    }
}
