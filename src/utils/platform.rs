//! Platform-specific helpers for locating external executables
//!
//! ODM shells out to two tools: `git` for fetching remote dependencies and
//! `opa` for evaluating, testing, building and rewriting policies. This module
//! hides the small differences in how those binaries are named and found.
//!
//! # Examples
//!
//! ```rust,no_run
//! use odm_cli::utils::platform::{command_exists, get_git_command};
//!
//! if !command_exists(get_git_command()) {
//!     eprintln!("git is not on PATH");
//! }
//! ```

/// Checks if the current platform is Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Returns the platform-appropriate git command name.
///
/// This is the command name, not a full path; the executable still has to be
/// found on `PATH`.
#[must_use]
pub const fn get_git_command() -> &'static str {
    if is_windows() {
        "git.exe"
    } else {
        "git"
    }
}

/// Checks whether `cmd` resolves to an executable.
///
/// Accepts a bare name (searched on `PATH`) or a path to a binary, so it also
/// works for a user-supplied `--opa-path`.
#[must_use]
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}
