//! Download management: per-user batches, single tracks and video extraction

pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod launcher;
pub mod progress;
pub mod registry;
pub mod transient;
pub mod worker;
pub mod ytdlp_errors;

// Re-exports for convenience
pub use error::FetchError;
pub use extractor::{ExtractError, ExtractedMedia, Extractor, YtDlpExtractor};
pub use fetcher::{deliver_single, CatalogFetcher, ItemFetcher};
pub use launcher::{Accepted, BatchLauncher, LaunchError};
pub use registry::{RegistrationGuard, TaskHandle, TaskRegistry};
pub use worker::{BatchOutcome, BatchWorker};
