//! Core module - error type, data model, validation and subprocess plumbing

mod error;
pub mod packages;
pub mod paths;
pub mod process;
pub mod testing;
mod types;
pub mod validation;

pub use error::{ErrorKind, PkgError, Result, format_error_with_suggestion};
pub use packages::PackageService;
pub use process::{CommandRunner, SystemRunner, ToolOutput};
pub use types::*;
