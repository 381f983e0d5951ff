//! Utility modules shared by the resolver and the CLI
//!
//! - [`fs`] - directory lifecycle, filtered copies, manifest file formats
//! - [`platform`] - locating the `git` and `opa` executables

pub mod fs;
pub mod platform;

pub use fs::{copy_dir_filtered, ensure_dir, recreate_dir, remove_dir_all, safe_write};
pub use platform::{command_exists, get_git_command, is_windows};
