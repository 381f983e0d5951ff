//! Integration test suite for ODM
//!
//! End-to-end tests driving the built `odm` binary against projects laid out
//! in temporary directories.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **init**: Project initialization
//! - **depend**: Adding dependencies to the manifest
//! - **update**: Materializing dependency trees and error reporting
//! - **list**: `list source` and `list tree` output
//! - **opa**: eval, test, build and namespace rewriting; skipped without `opa` on PATH

#[path = "../common/mod.rs"]
mod common;

mod depend;
mod init;
mod list;
mod opa;
mod update;
