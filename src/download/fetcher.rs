//! Single track: resolve, pick the best variant, download, deliver, clean up.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use super::error::FetchError;
use super::transient::TransientFile;
use crate::catalog::{best_variant, Catalog, TrackInfo, Variant};
use crate::core::types::{ItemId, MessageRef, UserId};
use crate::core::utils::{track_filename, truncate_for_display};
use crate::telegram::messenger::{AudioCaption, Messenger};

/// Fetches one track and delivers it to a user.
#[async_trait]
pub trait ItemFetcher: Send + Sync {
    async fn fetch_and_deliver(&self, item: &ItemId, user: UserId) -> Result<(), FetchError>;
}

/// Track metadata plus the variant chosen for it.
#[derive(Debug, Clone)]
pub struct ResolvedTrack {
    pub info: TrackInfo,
    pub variant: Variant,
    pub filename: String,
}

impl ResolvedTrack {
    pub fn caption(&self) -> AudioCaption {
        AudioCaption {
            caption: format!("✅ Quality: {} kbps", self.variant.bitrate_kbps),
            performer: self.info.display_artist().to_string(),
            title: self.info.title.clone(),
        }
    }
}

/// Looks the track up and selects the highest-bitrate variant.
pub async fn resolve_track(catalog: &dyn Catalog, item: &ItemId) -> Result<ResolvedTrack, FetchError> {
    let info = catalog.track(item).await?;
    let filename = track_filename(info.display_artist(), &info.title);

    let variants = catalog.download_variants(item).await?;
    let variant = best_variant(&variants).cloned().ok_or(FetchError::NoVariants)?;

    Ok(ResolvedTrack {
        info,
        variant,
        filename,
    })
}

/// [`ItemFetcher`] that downloads from a [`Catalog`] and sends audio via a [`Messenger`].
pub struct CatalogFetcher {
    catalog: Arc<dyn Catalog>,
    messenger: Arc<dyn Messenger>,
    download_dir: PathBuf,
}

impl CatalogFetcher {
    pub fn new(catalog: Arc<dyn Catalog>, messenger: Arc<dyn Messenger>, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            catalog,
            messenger,
            download_dir: download_dir.into(),
        }
    }

    /// Per-user directory so two users fetching the same track never share a file.
    fn user_dir(&self, user: UserId) -> PathBuf {
        self.download_dir.join(user.to_string())
    }
}

#[async_trait]
impl ItemFetcher for CatalogFetcher {
    async fn fetch_and_deliver(&self, item: &ItemId, user: UserId) -> Result<(), FetchError> {
        let track = resolve_track(self.catalog.as_ref(), item).await?;

        let dir = self.user_dir(user);
        fs_err::tokio::create_dir_all(&dir).await?;
        let file = TransientFile::new(dir.join(&track.filename));

        self.catalog.download_variant(&track.variant, file.path()).await?;
        self.messenger.send_audio(user, file.path(), &track.caption()).await?;

        log::info!(
            "Delivered track {} ({} kbps) to user {}",
            item,
            track.variant.bitrate_kbps,
            user
        );

        if let Err(e) = file.remove().await {
            log::warn!("Failed to remove delivered file for track {}: {}", item, e);
        }
        Ok(())
    }
}

/// Direct (non-batch) request for one track.
///
/// On success the request message is deleted; on failure the user is told
/// which request failed and the error is returned to the caller. No retry.
pub async fn deliver_single(
    fetcher: &dyn ItemFetcher,
    messenger: &dyn Messenger,
    item: &ItemId,
    request: MessageRef,
    request_text: &str,
) -> Result<(), FetchError> {
    match fetcher.fetch_and_deliver(item, request.user).await {
        Ok(()) => {
            if let Err(e) = messenger.delete(request).await {
                log::warn!("Failed to delete request message for track {}: {}", item, e);
            }
            Ok(())
        }
        Err(e) => {
            let notice = format!(
                "🚫 Could not download the track from {}: {}",
                truncate_for_display(request_text, 200),
                e
            );
            if let Err(send_err) = messenger.send_text(request.user, &notice).await {
                log::error!("Failed to notify user {} about failed track: {}", request.user, send_err);
            }
            Err(e)
        }
    }
}
