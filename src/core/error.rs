//! Error handling for ODM
//!
//! This module provides the error taxonomy and user-friendly error reporting for
//! the OPA dependency manager. The error system follows two principles:
//! 1. **Strongly-typed errors** for precise handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`OdmError`] - Enumerated error types for every failure the resolver can hit
//! - [`ErrorContext`] - Wrapper that adds a rendered message chain and suggestions
//!
//! # Error Categories
//!
//! - **Manifests**: [`OdmError::ManifestNotFound`], [`OdmError::ManifestParseError`]
//! - **Locations**: [`OdmError::UnsupportedLocation`], [`OdmError::MalformedLocation`],
//!   [`OdmError::SourceNotFound`]
//! - **Repositories**: [`OdmError::MissingRepositoryManifest`]
//! - **External tools**: [`OdmError::GitCloneFailed`], [`OdmError::OpaCommandFailed`], etc.
//!
//! # Propagation
//!
//! Errors are raised as [`OdmError`] at the failure site and travel up as
//! [`anyhow::Error`]. Every level of the recursive resolver adds the name of the
//! dependency or repository it was processing, so a failure deep in a transitive
//! tree reads as a chain:
//!
//! ```text
//! Failed to update dependency 'foo': Failed to update dependency 'no_deps': ...
//! ```
//!
//! [`user_friendly_error`] renders that chain and looks up a suggestion for the
//! innermost typed error.
//!
//! # Examples
//!
//! ```rust,no_run
//! use odm_cli::core::{OdmError, user_friendly_error};
//! use anyhow::Context;
//!
//! fn fetch() -> anyhow::Result<()> {
//!     Err(OdmError::UnsupportedLocation {
//!         location: "acme-lib".to_string(),
//!     })
//!     .context("Failed to update dependency 'acme'")
//! }
//!
//! if let Err(e) = fetch() {
//!     user_friendly_error(e).display();
//! }
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for ODM operations
///
/// Each variant maps to one failure mode of the resolver or of the external
/// collaborators it drives (git, the policy engine, the file system).
#[derive(Error, Debug, Clone)]
pub enum OdmError {
    /// No `opa.project` manifest at the expected path
    ///
    /// Recoverable when the caller explicitly allows a missing manifest
    /// (`init`, `depend`), fatal everywhere else.
    #[error("Project manifest not found: {path}")]
    ManifestNotFound {
        /// Path that was expected to hold the manifest
        path: String,
    },

    /// Manifest exists but could not be parsed
    #[error("Invalid manifest file syntax in {file}")]
    ManifestParseError {
        /// Path to the manifest file that failed to parse
        file: String,
        /// Parser diagnostic
        reason: String,
    },

    /// Refusing to overwrite an existing manifest
    #[error("Project manifest already exists: {path}")]
    ManifestAlreadyExists {
        /// Path of the existing manifest
        path: String,
    },

    /// Location matched no scheme and no repository library
    #[error("Unsupported dependency location: {location}")]
    UnsupportedLocation {
        /// The raw location string as declared
        location: String,
    },

    /// Location uses a known scheme but is syntactically invalid
    #[error("Malformed location '{location}': {reason}")]
    MalformedLocation {
        /// The raw location string as declared
        location: String,
        /// What is wrong with it
        reason: String,
    },

    /// A local dependency points at a path that does not exist
    #[error("Dependency source does not exist: {path}")]
    SourceNotFound {
        /// The resolved file system path
        path: String,
    },

    /// A fetched repository has no `repository.yaml` at its root
    #[error("Repository at {location} has no repository.yaml")]
    MissingRepositoryManifest {
        /// The repository location
        location: String,
    },

    /// Dependency directories were requested before update or load ran
    #[error("Dependency '{name}' has not been materialized")]
    DependencyNotMaterialized {
        /// Dependency name
        name: String,
    },

    /// Generic file system failure
    #[error("File system error during {operation}: {path}")]
    FileSystemError {
        /// The operation being performed (e.g. "create directory")
        operation: String,
        /// The offending path
        path: String,
    },

    /// Git executable not found in PATH
    #[error("Git is not installed or not found in PATH")]
    GitNotFound,

    /// Git command exited with a failure status
    #[error("Git operation failed: {operation}")]
    GitCommandError {
        /// The git operation that failed (e.g. "clone", "checkout")
        operation: String,
        /// Error output from git
        stderr: String,
    },

    /// Git clone failed
    #[error("Failed to clone repository: {url}")]
    GitCloneFailed {
        /// The repository URL that failed to clone
        url: String,
        /// Captured git output
        reason: String,
    },

    /// Git checkout failed
    #[error("Failed to checkout reference '{reference}' in repository")]
    GitCheckoutFailed {
        /// The reference that failed to checkout
        reference: String,
        /// Captured git output
        reason: String,
    },

    /// The policy engine binary could not be started
    #[error("OPA executable '{path}' not found")]
    OpaNotFound {
        /// The configured engine binary
        path: String,
    },

    /// The policy engine ran and reported a failure
    #[error("opa {command} failed:\n{output}")]
    OpaCommandFailed {
        /// The engine sub-command (eval, test, build, refactor)
        command: String,
        /// Captured stderr, or stdout when stderr was empty
        output: String,
    },
}

/// Error with a rendered message chain and an optional suggestion
///
/// Produced by [`user_friendly_error`] for display at the CLI boundary.
#[derive(Debug)]
pub struct ErrorContext {
    /// The full error chain, outermost context first
    pub message: String,
    /// The innermost typed error, if any link of the chain was an [`OdmError`]
    pub error: Option<OdmError>,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context from a message alone.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
            suggestion: None,
            details: None,
        }
    }

    /// Attach the typed error this context was derived from.
    #[must_use]
    pub fn with_error(mut self, error: OdmError) -> Self {
        self.error = Some(error);
        self
    }

    /// Add a suggestion for resolving the error.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

/// Convert any error into a displayable [`ErrorContext`].
///
/// The message is the complete `anyhow` chain joined with `": "`, so nested
/// dependency failures keep their full path. The suggestion comes from the
/// innermost [`OdmError`] found in the chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let message = format!("{error:#}");

    let typed = error.chain().filter_map(|cause| cause.downcast_ref::<OdmError>()).last().cloned();

    let Some(typed) = typed else {
        if let Some(io_error) = error.chain().find_map(|c| c.downcast_ref::<std::io::Error>())
            && io_error.kind() == std::io::ErrorKind::PermissionDenied
        {
            return ErrorContext::new(message)
                .with_suggestion("Check file ownership and permissions of the project directory");
        }
        return ErrorContext::new(message);
    };

    let ctx = ErrorContext::new(message);
    let ctx = match &typed {
        OdmError::ManifestNotFound { .. } => ctx
            .with_suggestion("Run 'odm init' to create an opa.project manifest")
            .with_details("ODM reads opa.project from the project directory (see --project)"),
        OdmError::ManifestParseError { reason, .. } => ctx
            .with_details(reason.clone())
            .with_suggestion("Check the YAML syntax of the manifest"),
        OdmError::ManifestAlreadyExists { .. } => {
            ctx.with_suggestion("Edit the existing manifest, or use 'odm depend' to add dependencies")
        }
        OdmError::UnsupportedLocation { .. } => ctx
            .with_suggestion(
                "Use a 'file:' or 'git+' location, or declare a repository whose repository.yaml lists this library",
            ),
        OdmError::MalformedLocation { .. } => {
            ctx.with_suggestion("A git location may carry at most one '#<tag>' suffix")
        }
        OdmError::SourceNotFound { .. } => ctx.with_suggestion(
            "Relative 'file:' locations resolve against the directory holding opa.project",
        ),
        OdmError::MissingRepositoryManifest { .. } => ctx.with_suggestion(
            "Add a repository.yaml with a 'libraries' table to the root of the repository",
        ),
        OdmError::GitNotFound => ctx.with_suggestion("Install git and make sure it is on PATH"),
        OdmError::GitCloneFailed { reason, .. } | OdmError::GitCheckoutFailed { reason, .. } => ctx
            .with_details(reason.trim().to_string())
            .with_suggestion("Check the repository URL, tag name and your git credentials"),
        OdmError::GitCommandError { stderr, .. } => ctx.with_details(stderr.trim().to_string()),
        OdmError::OpaNotFound { .. } => ctx.with_suggestion(
            "Install OPA, or point --opa-path / OPA_PATH at the opa executable",
        ),
        OdmError::OpaCommandFailed { .. }
        | OdmError::DependencyNotMaterialized { .. }
        | OdmError::FileSystemError { .. } => ctx,
    };

    ctx.with_error(typed)
}
