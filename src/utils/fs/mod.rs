//! File system utilities used while materializing dependencies
//!
//! Every update rebuilds dependency directories from scratch, so the helpers
//! here are about clean directory lifecycles: wipe and recreate, copy with
//! exclusions, and write manifests atomically.
//!
//! # Examples
//!
//! ```rust,no_run
//! use odm_cli::utils::fs::{copy_dir_filtered, recreate_dir};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let target = Path::new(".opa/dependencies/3f2a");
//! recreate_dir(target)?;
//! copy_dir_filtered(Path::new("../shared-policies"), target, &[".opa"], true)?;
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod dirs;
pub mod formats;
pub mod paths;

pub use dirs::{copy_dir_filtered, ensure_dir, recreate_dir, remove_dir_all};

pub use atomic::{atomic_write, safe_write};

pub use formats::{read_text_file, read_yaml_file, write_text_file, write_yaml_file};

pub use paths::{filter_existing, normalize_path};
