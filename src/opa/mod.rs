//! Adapter for the `opa` executable.
//!
//! [`Opa`] carries everything an invocation needs besides the pass-through
//! flags: the binary, the data locations of the resolved project, and the
//! build entrypoints and target. Each operation shapes its own argument list,
//! runs the binary with captured output and returns stdout.
//!
//! ```rust,no_run
//! use odm_cli::opa::Opa;
//! use std::path::PathBuf;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let opa = Opa::new("opa").with_data_locations(vec![PathBuf::from("src")]);
//! let result = opa.eval(&["data.main.allow".to_string()]).await?;
//! println!("{result}");
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::core::OdmError;
use crate::project::NamespaceRewriter;

/// Binary used when neither `--opa-path` nor `OPA_PATH` is set.
pub const DEFAULT_OPA_PATH: &str = "opa";

/// A configured `opa` binary.
#[derive(Debug, Clone)]
pub struct Opa {
    path: String,
    data_locations: Vec<PathBuf>,
    entrypoints: Vec<String>,
    target: Option<String>,
}

impl Opa {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        tracing::debug!("Using OPA executable {path}");
        Self {
            path,
            data_locations: Vec::new(),
            entrypoints: Vec::new(),
            target: None,
        }
    }

    #[must_use]
    pub fn with_data_locations(mut self, locations: Vec<PathBuf>) -> Self {
        self.data_locations = locations;
        self
    }

    #[must_use]
    pub fn with_entrypoints(mut self, entrypoints: Vec<String>) -> Self {
        self.entrypoints = entrypoints;
        self
    }

    /// Build target (`rego`, `wasm`, `plan`); `None` leaves opa's default.
    #[must_use]
    pub fn with_target(mut self, target: Option<String>) -> Self {
        self.target = target.filter(|t| !t.is_empty());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn data_locations(&self) -> &[PathBuf] {
        &self.data_locations
    }

    /// `eval -d <loc>... <flags>`
    pub fn eval_args(&self, flags: &[String]) -> Vec<String> {
        let mut args = vec!["eval".to_string()];
        for location in &self.data_locations {
            args.push("-d".to_string());
            args.push(location.display().to_string());
        }
        args.extend(flags.iter().cloned());
        args
    }

    /// `test <loc>... <flags>`
    pub fn test_args(&self, flags: &[String]) -> Vec<String> {
        let mut args = vec!["test".to_string()];
        args.extend(self.data_locations.iter().map(|l| l.display().to_string()));
        args.extend(flags.iter().cloned());
        args
    }

    /// `build <loc>... [-t target] [-o output] [-e entrypoint]... <flags>`
    ///
    /// A target or output given in `flags` wins over the configured one.
    pub fn build_args(&self, output: &Path, flags: &[String]) -> Vec<String> {
        let mut args = vec!["build".to_string()];
        args.extend(self.data_locations.iter().map(|l| l.display().to_string()));

        if let Some(target) = &self.target {
            if has_flag(flags, "-t", "--target") {
                tracing::debug!("Target given in pass-through flags, ignoring configured {target}");
            } else {
                args.push("-t".to_string());
                args.push(target.clone());
            }
        }

        if has_flag(flags, "-o", "--output") {
            tracing::debug!("Output given in pass-through flags, ignoring {}", output.display());
        } else {
            args.push("-o".to_string());
            args.push(output.display().to_string());
        }

        for entrypoint in &self.entrypoints {
            args.push("-e".to_string());
            args.push(entrypoint.clone());
        }

        args.extend(flags.iter().cloned());
        args
    }

    /// `refactor move <dir>... -w -p <from>:<to>`
    pub fn refactor_args(dirs: &[PathBuf], from: &str, to: &str) -> Vec<String> {
        let mut args = vec!["refactor".to_string(), "move".to_string()];
        args.extend(dirs.iter().map(|d| d.display().to_string()));
        args.extend(["-w".to_string(), "-p".to_string(), format!("{from}:{to}")]);
        args
    }

    pub async fn eval(&self, flags: &[String]) -> Result<String> {
        tracing::info!("Running OPA eval");
        self.run(self.eval_args(flags)).await
    }

    pub async fn test(&self, flags: &[String]) -> Result<String> {
        tracing::info!("Running OPA test");
        self.run(self.test_args(flags)).await
    }

    pub async fn build(&self, output: &Path, flags: &[String]) -> Result<String> {
        tracing::info!("Running OPA build");
        tracing::debug!("Output bundle path: {}", output.display());
        self.run(self.build_args(output, flags)).await
    }

    /// Moves every package under `from` to `to` in place.
    pub async fn refactor(&self, dirs: &[PathBuf], from: &str, to: &str) -> Result<String> {
        tracing::debug!("Refactoring {from} to {to}");
        self.run(Self::refactor_args(dirs, from, to)).await
    }

    async fn run(&self, args: Vec<String>) -> Result<String> {
        let command = args.first().cloned().unwrap_or_default();
        tracing::trace!("Executing {} {}", self.path, args.join(" "));

        let output = Command::new(&self.path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match output {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(OdmError::OpaNotFound {
                    path: self.path.clone(),
                }
                .into());
            }
            other => other.with_context(|| format!("Failed to execute {} {command}", self.path))?,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            tracing::debug!("opa {command} exited with {:?}", output.status.code());
            return Err(OdmError::OpaCommandFailed {
                command,
                output: if stderr.is_empty() {
                    stdout
                } else {
                    stderr
                },
            }
            .into());
        }

        Ok(stdout)
    }
}

impl Default for Opa {
    fn default() -> Self {
        Self::new(DEFAULT_OPA_PATH)
    }
}

impl NamespaceRewriter for Opa {
    async fn rewrite(&self, dirs: &[PathBuf], from: &str, to: &str) -> Result<()> {
        self.refactor(dirs, from, to).await?;
        Ok(())
    }
}

fn has_flag(flags: &[String], short: &str, long: &str) -> bool {
    flags.iter().any(|f| f == short || f == long)
}
