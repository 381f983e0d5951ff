//! Core types shared across ODM: the error taxonomy and file-context helpers.

pub mod error;
pub mod file_error;

pub use error::{ErrorContext, OdmError, user_friendly_error};
pub use file_error::{FileOperation, FileOperationError, FileResultExt};
