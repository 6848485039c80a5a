//! Music catalog abstraction.
//!
//! The fetcher and the handlers only see the [`Catalog`] trait. The
//! production implementation talks to the Yandex Music HTTP API
//! ([`yandex::YandexMusicClient`]).

pub mod yandex;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use crate::core::types::ItemId;

pub use yandex::YandexMusicClient;

/// Catalog errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the API
    #[error("Catalog request failed with status {status}: {url}")]
    Status { status: reqwest::StatusCode, url: String },

    /// The API answered, but the object is not there
    #[error("Not found: {0}")]
    NotFound(String),

    /// The API answered with something we could not understand
    #[error("Unexpected catalog response: {0}")]
    InvalidResponse(String),

    /// Writing the downloaded bytes failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Display metadata of a track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub id: ItemId,
    pub title: String,
    pub artists: Vec<String>,
}

impl TrackInfo {
    /// First credited artist, the one shown in file names and captions.
    pub fn display_artist(&self) -> &str {
        self.artists
            .first()
            .map(String::as_str)
            .unwrap_or("Unknown artist")
    }
}

/// One quality/format option of a track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub codec: String,
    pub bitrate_kbps: u32,
    /// Opaque locator the catalog uses to fetch the bytes
    pub handle: String,
}

/// A resolved playlist, album or favorites list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackList {
    pub title: String,
    pub item_ids: Vec<ItemId>,
}

/// Everything the bot needs from a music catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn track(&self, id: &ItemId) -> Result<TrackInfo, CatalogError>;

    /// Available download variants in the order the catalog lists them.
    async fn download_variants(&self, id: &ItemId) -> Result<Vec<Variant>, CatalogError>;

    /// Fetches the bytes of `variant` into `dest`.
    async fn download_variant(&self, variant: &Variant, dest: &Path) -> Result<(), CatalogError>;

    async fn playlist(&self, owner: &str, kind: &str) -> Result<TrackList, CatalogError>;

    async fn album(&self, album_id: &str) -> Result<TrackList, CatalogError>;

    /// Tracks the authenticated account has liked.
    async fn liked_tracks(&self) -> Result<TrackList, CatalogError>;
}

/// Picks the highest bitrate; on ties the variant listed first wins.
pub fn best_variant(variants: &[Variant]) -> Option<&Variant> {
    variants
        .iter()
        .reduce(|best, v| if v.bitrate_kbps > best.bitrate_kbps { v } else { best })
}
