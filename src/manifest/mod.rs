//! Manifest file parsing for ODM projects.
//!
//! This module handles the two YAML documents ODM reads:
//!
//! - `opa.project`, the project manifest, mapped onto [`ProjectManifest`]
//! - `repository.yaml`, a repository's library table, mapped onto [`RepositoryManifest`]
//!
//! These are the on-disk shapes only. [`crate::project::Project`] converts a
//! manifest into the resolvable dependency graph, parsing every location once.
//!
//! # Basic Structure
//!
//! ```yaml
//! name: acme-policies
//! version: 0.1.0
//! source: src
//! test:
//!   - test
//!   - integration
//! dependencies:
//!   common: file:/../common
//!   authz:
//!     location: git+https://github.com/acme/authz.git#v1.2.0
//!     namespace: acme.authz
//!   raw:
//!     location: file:/../raw
//!     namespace: false
//! repositories:
//!   - git+https://github.com/acme/policy-repo.git
//! build:
//!   output: dist/bundle.tar.gz
//!   target: wasm
//!   entrypoints:
//!     - main/allow
//! ```
//!
//! # Dependency Formats
//!
//! - **Simple**: `common: file:/../common` (namespace is the dependency name)
//! - **Detailed**: `{ location: ..., namespace: ... }` where `namespace` is
//!   `false` (no namespace), `true` (the dependency name), a string, or absent
//!   (the dependency name)
//!
//! `source` and `test` accept a single string or a list.

mod manifest_io;
pub mod repository;


pub use manifest_io::{load_project_manifest, manifest_file_path, save_project_manifest};
pub use repository::{REPOSITORY_MANIFEST, RepositoryManifest};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The serialized form of `opa.project`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectManifest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// Policy source directories, relative to the manifest directory.
    #[serde(default, skip_serializing_if = "Vec::is_empty", with = "one_or_many")]
    pub source: Vec<String>,

    /// Policy test directories, relative to the manifest directory.
    #[serde(default, skip_serializing_if = "Vec::is_empty", with = "one_or_many")]
    pub test: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, DependencySpec>,

    /// Locations of library repositories, searched in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repositories: Vec<String>,

    #[serde(default, skip_serializing_if = "BuildConfig::is_empty")]
    pub build: BuildConfig,
}

/// Settings for `odm build`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entrypoints: Vec<String>,
}

impl BuildConfig {
    pub fn is_empty(&self) -> bool {
        self.output.is_none() && self.target.is_none() && self.entrypoints.is_empty()
    }
}

/// One entry of the `dependencies` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencySpec {
    /// `name: <location>`; the namespace is the dependency name.
    Simple(String),

    /// `name: { location, namespace }`
    Detailed(DetailedDependency),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedDependency {
    pub location: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<NamespaceSpec>,
}

/// The `namespace` value of a detailed dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NamespaceSpec {
    /// `false` disables namespacing; `true` uses the dependency name.
    Enabled(bool),
    Named(String),
}

impl DependencySpec {
    /// Builds the most compact entry that round-trips `location` and `namespace`.
    pub fn new(name: &str, location: &str, namespace: &str) -> Self {
        if namespace == name {
            return Self::Simple(location.to_string());
        }

        let namespace = if namespace.is_empty() {
            NamespaceSpec::Enabled(false)
        } else {
            NamespaceSpec::Named(namespace.to_string())
        };

        Self::Detailed(DetailedDependency {
            location: location.to_string(),
            namespace: Some(namespace),
        })
    }

    pub fn location(&self) -> &str {
        match self {
            Self::Simple(location) => location,
            Self::Detailed(detailed) => &detailed.location,
        }
    }

    /// The effective namespace of a dependency declared under `name`.
    pub fn namespace(&self, name: &str) -> String {
        match self {
            Self::Simple(_)
            | Self::Detailed(DetailedDependency {
                namespace: None | Some(NamespaceSpec::Enabled(true)),
                ..
            }) => name.to_string(),
            Self::Detailed(DetailedDependency {
                namespace: Some(NamespaceSpec::Enabled(false)),
                ..
            }) => String::new(),
            Self::Detailed(DetailedDependency {
                namespace: Some(NamespaceSpec::Named(ns)),
                ..
            }) => ns.clone(),
        }
    }
}

/// Serde adapter for fields that accept either a single string or a list.
///
/// A single element is written back as a plain string.
mod one_or_many {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    pub fn serialize<S>(values: &[String], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match values {
            [one] => serializer.serialize_str(one),
            many => many.serialize(serializer),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        })
    }
}
