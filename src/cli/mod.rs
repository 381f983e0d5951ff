//! Command-line interface for ODM (OPA Dependency Manager).
//!
//! Each command lives in its own module with its own `clap` argument struct
//! and an `execute` method taking the shared [`CliConfig`] and the sink
//! command output is written to.
//!
//! # Available Commands
//!
//! ## Project Management
//! - `init` - Create a new project with an `opa.project` manifest
//! - `depend` - Add or replace a dependency in the manifest
//! - `update` - Fetch every dependency and move it under its namespace
//!
//! ## Running OPA
//! - `eval` - `opa eval` with every data location of the project
//! - `test` - `opa test` with data and test locations
//! - `build` - `opa build` into the configured bundle path
//!
//! ## Inspection
//! - `list source` - Print the data (and test) locations
//! - `list tree` - Print the resolved dependency tree
//!
//! # Example
//!
//! ```bash
//! odm init acme
//! cd acme
//! odm depend common git+https://github.com/acme/common.git#v1.0.0 -n
//! odm update
//! odm eval -- "data.acme.allow"
//! ```
//!
//! # Global Options
//!
//! - `-v` - Log verbosity, repeatable (`-v` info, `-vv` debug, `-vvv` trace)
//! - `--opa-path` - The `opa` executable (also `OPA_PATH`)
//! - `-p, --project` - Project directory, defaults to the current directory
//!
//! Logging goes to stderr; `RUST_LOG` overrides the level chosen by `-v`.

mod build;
pub mod common;
mod depend;
mod eval;
mod init;
mod list;
mod update;


use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::instrument::WithSubscriber;
use tracing_subscriber::EnvFilter;

use crate::opa::{DEFAULT_OPA_PATH, Opa};

/// Runtime configuration shared by all commands.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Number of `-v` flags.
    pub verbosity: u8,
    /// The `opa` executable.
    pub opa_path: String,
    /// Directory holding (or that will hold) `opa.project`.
    pub project_dir: PathBuf,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            opa_path: DEFAULT_OPA_PATH.to_string(),
            project_dir: PathBuf::from("."),
        }
    }
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The log level selected by the verbosity count.
    pub const fn log_level(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// `RUST_LOG` when set and valid, otherwise [`Self::log_level`].
    pub fn env_filter(&self) -> EnvFilter {
        if std::env::var_os("RUST_LOG").is_some()
            && let Ok(filter) = EnvFilter::try_from_default_env()
        {
            return filter;
        }
        EnvFilter::new(self.log_level())
    }

    /// A stderr subscriber for one command execution.
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + 'static {
        tracing_subscriber::fmt()
            .with_env_filter(self.env_filter())
            .with_writer(std::io::stderr)
            .with_target(self.verbosity >= 3)
            .finish()
    }

    pub fn opa(&self) -> Opa {
        Opa::new(self.opa_path.clone())
    }
}

#[derive(Parser)]
#[command(
    name = "odm",
    about = "OPA Dependency Manager - fetch policy dependencies under their own namespaces",
    version,
    long_about = "ODM materializes the dependencies declared in opa.project into .opa/dependencies \
                  and moves each one under its own data namespace, so policies from different \
                  projects never collide."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Path to the opa executable
    #[arg(long, global = true, env = "OPA_PATH", default_value = DEFAULT_OPA_PATH)]
    opa_path: String,

    /// Project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    project: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new OPA project
    Init(init::InitCommand),

    /// Add a dependency to the project
    Depend(depend::DependCommand),

    /// Update project dependencies
    Update(update::UpdateCommand),

    /// Evaluate a Rego query using OPA
    Eval(eval::EvalCommand),

    /// Run OPA tests
    Test(test::TestCommand),

    /// Build an OPA bundle
    Build(build::BuildCommand),

    /// List project resources
    List(list::ListCommand),
}

impl Cli {
    /// Runs the command, writing its output to stdout.
    pub async fn execute(self) -> Result<()> {
        let mut stdout = std::io::stdout();
        self.execute_with_output(&mut stdout).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        CliConfig {
            verbosity: self.verbose,
            opa_path: self.opa_path.clone(),
            project_dir: self.project.clone(),
        }
    }

    /// Runs the command with logging scoped to this execution.
    pub async fn execute_with_output(self, out: &mut impl Write) -> Result<()> {
        let config = self.build_config();
        let subscriber = config.subscriber();

        async move {
            match self.command {
                Commands::Init(cmd) => cmd.execute(&config, out).await,
                Commands::Depend(cmd) => cmd.execute(&config, out).await,
                Commands::Update(cmd) => cmd.execute(&config, out).await,
                Commands::Eval(cmd) => cmd.execute(&config, out).await,
                Commands::Test(cmd) => cmd.execute(&config, out).await,
                Commands::Build(cmd) => cmd.execute(&config, out).await,
                Commands::List(cmd) => cmd.execute(&config, out).await,
            }
        }
        .with_subscriber(subscriber)
        .await
    }
}
