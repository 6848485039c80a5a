use thiserror::Error;

use crate::catalog::CatalogError;
use crate::telegram::messenger::MessengerError;

/// Failure to fetch or deliver one track.
///
/// Always carries the original cause; callers decide whether to skip the
/// track (batch) or surface the error (single-track path).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Metadata lookup or byte download failed
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The catalog offered nothing to download
    #[error("no download variants available")]
    NoVariants,

    /// The file was fetched but could not be sent to the user
    #[error("failed to deliver track: {0}")]
    Delivery(#[from] MessengerError),

    /// Local filesystem failure around the transient file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Returns subcategory for log lines
    pub fn subcategory(&self) -> &'static str {
        match self {
            FetchError::Catalog(_) => "catalog",
            FetchError::NoVariants => "no_variants",
            FetchError::Delivery(_) => "delivery",
            FetchError::Io(_) => "io",
        }
    }
}
