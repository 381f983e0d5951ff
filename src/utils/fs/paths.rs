//! Path helpers.

use std::path::{Path, PathBuf};

/// Lexically normalizes a path, dropping `.` and folding `..` into its parent.
///
/// Does not touch the file system, so it works on paths that do not exist yet.
///
/// # Examples
///
/// ```rust
/// use odm_cli::utils::fs::normalize_path;
/// use std::path::{Path, PathBuf};
///
/// let path = normalize_path(Path::new("/work/app/../libs/./acme"));
/// assert_eq!(path, PathBuf::from("/work/libs/acme"));
/// ```
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => match components.last() {
                Some(std::path::Component::Normal(_)) => {
                    components.pop();
                }
                Some(std::path::Component::RootDir | std::path::Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            c => components.push(c),
        }
    }

    if components.is_empty() {
        return PathBuf::from(".");
    }
    components.iter().collect()
}

/// Keeps only the paths that exist, preserving order.
#[must_use]
pub fn filter_existing(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths.into_iter().filter(|p| p.exists()).collect()
}
