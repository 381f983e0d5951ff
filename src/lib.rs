//! ODM - OPA Dependency Manager
//!
//! Fetches the policy dependencies an `opa.project` manifest declares and
//! moves each one under its own `data` namespace, so Rego packages from
//! different projects can be loaded side by side without colliding.
//!
//! # Architecture Overview
//!
//! - `opa.project` declares source and test directories, dependencies and
//!   library repositories
//! - Dependencies are copied (`file:`) or cloned (`git+`) into
//!   `.opa/dependencies/<hash>`, where the hash covers both the effective
//!   namespace and the location
//! - Dependencies with their own manifest are resolved recursively into their
//!   own `.opa/dependencies`, and namespaces compose along the way
//!   (`data.foo.no_deps`)
//! - The `opa` binary does the package rewriting and runs eval, test and build
//!   against the resolved data locations
//!
//! # Core Modules
//!
//! - [`cli`] - Command-line interface
//! - [`core`] - Error taxonomy and user-facing error rendering
//! - [`location`] - Parsing and materializing dependency locations
//! - [`manifest`] - `opa.project` and `repository.yaml` serialization
//! - [`project`] - The resolution engine: projects, dependencies, repositories
//!
//! ## Integrations
//! - [`git`] - Cloning and tag checkout through the system `git`
//! - [`opa`] - Running the `opa` executable
//!
//! ## Supporting
//! - [`utils`] - File system and platform helpers
//!
//! # Example
//!
//! ```yaml
//! name: acme
//! source: src
//! test: test
//! repositories:
//!   - git+https://github.com/acme/policy-libraries.git
//! dependencies:
//!   common: git+https://github.com/acme/common.git#v1.2.0
//!   raw:
//!     location: file:/../raw
//!     namespace: false
//!   audit: audit-lib
//! ```
//!
//! ```rust,no_run
//! use odm_cli::opa::Opa;
//! use odm_cli::project::Project;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let opa = Opa::default();
//! let mut project = Project::read(Path::new("."), false)?;
//! project.update(&opa).await?;
//!
//! let result = opa
//!     .with_data_locations(project.data_locations()?)
//!     .eval(&["data.acme.allow".to_string()])
//!     .await?;
//! # Ok(())
//! # }
//! ```

// Core functionality modules
pub mod cli;
pub mod core;
pub mod location;
pub mod manifest;
pub mod project;

// External tools
pub mod git;
pub mod opa;

// Supporting modules
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
