use thiserror::Error;

use crate::catalog::CatalogError;
use crate::download::error::FetchError;
use crate::download::extractor::ExtractError;
use crate::download::launcher::LaunchError;
use crate::telegram::messenger::MessengerError;

/// Centralized error types for the application
///
/// Every concern keeps its own error enum; this one wraps them for the places
/// (CLI, handler glue) that deal with more than one concern at a time.
///
/// # Example
///
/// ```no_run
/// use tunedrop::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Music catalog errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Single track download/delivery errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Generic media extraction errors
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Batch launch was refused
    #[error("Launch error: {0}")]
    Launch(#[from] LaunchError),

    /// Chat transport errors
    #[error("Messaging error: {0}")]
    Messaging(#[from] MessengerError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
