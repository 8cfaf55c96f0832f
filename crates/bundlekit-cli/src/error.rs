//! Errors surfaced by the CLI.

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    /// Anything raised by the library keeps its own diagnostic.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Bundlekit(#[from] bundlekit::Error),

    /// A passthrough that reports success as a flag returned false.
    #[error("{operation} failed")]
    #[diagnostic(
        code(bundlekit::cli::operation_failed),
        help("See the package manager output above")
    )]
    OperationFailed { operation: &'static str },

    #[error("failed to render config: {0}")]
    #[diagnostic(code(bundlekit::cli::json))]
    Json(#[from] serde_json::Error),
}
