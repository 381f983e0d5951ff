//! Content-addressed directory names.
//!
//! Materialized dependencies and repositories live in directories named
//! after a SHA-256 digest of their identity, so the same declaration always
//! lands in the same place and siblings never collide.

use sha2::{Digest, Sha256};

/// Directory name for a dependency: `sha256("<namespace>:<location>")`, hex encoded.
pub fn dependency_id(full_namespace: &str, location: &str) -> String {
    digest(&format!("{full_namespace}:{location}"))
}

/// Directory name for a repository: `sha256("<location>")`, hex encoded.
pub fn repository_id(location: &str) -> String {
    digest(location)
}

fn digest(cleartext: &str) -> String {
    hex::encode(Sha256::digest(cleartext.as_bytes()))
}
