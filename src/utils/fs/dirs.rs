//! Directory operations for creating, copying, and removing directories.
//!
//! Copying is the file-copy primitive behind local dependency materialization:
//! it can exclude named entries at any depth and skip zero-length files.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::core::{FileOperation, FileResultExt, OdmError};

/// Ensures a directory exists, creating it and all parent directories if necessary.
///
/// # Returns
///
/// - `Ok(())` if the directory exists or was successfully created
/// - [`OdmError::FileSystemError`] if the path exists but is not a directory
/// - `Err` if creation fails
///
/// # Examples
///
/// ```rust,no_run
/// use odm_cli::utils::fs::ensure_dir;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// ensure_dir(Path::new(".opa/dependencies"))?;
/// # Ok(())
/// # }
/// ```
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).with_file_context(
            FileOperation::CreateDir,
            path,
            "ensuring directory exists",
        )?;
    } else if !path.is_dir() {
        return Err(OdmError::FileSystemError {
            operation: "create directory".to_string(),
            path: path.display().to_string(),
        }
        .into());
    }
    Ok(())
}

/// Recursively removes a directory and all its contents.
///
/// Safe to call on a path that does not exist.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path).with_file_context(
            FileOperation::RemoveDir,
            path,
            "removing directory tree",
        )?;
    }
    Ok(())
}

/// Deletes `path` if present and creates it again, empty.
///
/// Every materialization starts from this so content from an earlier run can
/// never leak into the new one.
pub fn recreate_dir(path: &Path) -> Result<()> {
    remove_dir_all(path)?;
    ensure_dir(path)
}

/// Recursively copies `src` into `dst`.
///
/// Entries whose file name is listed in `exclude` are skipped together with
/// their whole subtree, at any depth. With `skip_empty`, zero-length files are
/// not copied. If `src` is a single file it is copied into `dst` under its own
/// name.
///
/// Symbolic links are followed, so linked content is copied as regular files.
pub fn copy_dir_filtered(src: &Path, dst: &Path, exclude: &[&str], skip_empty: bool) -> Result<()> {
    if !src.exists() {
        return Err(anyhow::anyhow!("Source file/directory does not exist: {}", src.display()));
    }
    ensure_dir(dst)?;

    if src.is_file() {
        let name = src
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Source path has no file name: {}", src.display()))?;
        return copy_file(src, &dst.join(name), skip_empty);
    }

    tracing::debug!("Copying directory {} to {}", src.display(), dst.display());

    let walker = WalkDir::new(src)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let excluded = exclude.iter().any(|name| entry.file_name() == *name);
            if excluded {
                tracing::trace!("Skipping excluded entry {}", entry.path().display());
            }
            !excluded
        });

    for entry in walker {
        let entry =
            entry.with_context(|| format!("Failed to walk directory: {}", src.display()))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("Path escaped copy root: {}", entry.path().display()))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else if entry.file_type().is_file() {
            copy_file(entry.path(), &target, skip_empty)?;
        }
    }

    Ok(())
}

fn copy_file(src: &Path, dst: &Path, skip_empty: bool) -> Result<()> {
    let len = fs::metadata(src)
        .with_file_context(FileOperation::Metadata, src, "checking source file size")?
        .len();
    if skip_empty && len == 0 {
        tracing::debug!("Skipping empty file {}", src.display());
        return Ok(());
    }

    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }
    fs::copy(src, dst).with_file_context(
        FileOperation::Copy,
        src,
        format!("copying to {}", dst.display()),
    )?;
    Ok(())
}
