//! Text message handler: link routing, single tracks and external videos

use url::Url;

use super::commands::start_batch;
use super::types::{delete_request, HandlerDeps, HandlerError, IncomingMessage};
use crate::core::config;
use crate::core::types::{Batch, ItemId};
use crate::download::deliver_single;
use crate::download::transient::TransientFile;
use crate::telegram::links::{classify, find_url, LinkKind};

const UNSUPPORTED_LINK_TEXT: &str = "I can't recognise this link. Supported are Yandex Music tracks, albums \
     and playlists, and videos from YouTube/TikTok/Instagram.";

/// Handle a plain text message
pub async fn handle_text(deps: &HandlerDeps, msg: &IncomingMessage) -> Result<(), HandlerError> {
    if !deps.access.admit(msg.user).await {
        return Ok(());
    }

    let Some(url) = find_url(&msg.text) else {
        deps.messenger
            .send_text(msg.user, "Please send me a valid link.")
            .await?;
        return Ok(());
    };

    if let Err(e) = route_link(deps, msg, url).await {
        log::error!("Error processing URL {} for user {}: {}", url, msg.user, e);
        deps.messenger
            .send_text(msg.user, &format!("🚫 Error processing the link: {}", e))
            .await?;
    }
    Ok(())
}

async fn route_link(deps: &HandlerDeps, msg: &IncomingMessage, url: &str) -> Result<(), HandlerError> {
    match classify(url) {
        LinkKind::Playlist { owner, kind } => {
            deps.messenger
                .send_text(msg.user, "Fetching the playlist tracks...")
                .await?;
            let list = deps.catalog.playlist(&owner, &kind).await?;
            start_batch(deps, msg, Batch::new(list.item_ids, list.title)).await?;
        }
        LinkKind::Album { id } => {
            deps.messenger
                .send_text(msg.user, "Fetching the album tracks...")
                .await?;
            let list = deps.catalog.album(&id).await?;
            start_batch(deps, msg, Batch::new(list.item_ids, list.title)).await?;
        }
        LinkKind::Track { id } => {
            deliver_single(
                deps.fetcher.as_ref(),
                deps.messenger.as_ref(),
                &ItemId::new(id),
                msg.message_ref(),
                &msg.text,
            )
            .await?;
        }
        LinkKind::ExternalVideo(video_url) => {
            spawn_external_download(deps.clone(), msg.clone(), video_url);
        }
        LinkKind::Unsupported => {
            deps.messenger.send_text(msg.user, UNSUPPORTED_LINK_TEXT).await?;
        }
    }
    Ok(())
}

/// Runs [`download_external`] in the background so the dispatcher stays responsive.
fn spawn_external_download(deps: HandlerDeps, msg: IncomingMessage, url: Url) {
    tokio::spawn(async move {
        if let Err(e) = download_external(&deps, &msg, &url).await {
            log::error!("External download of {} failed for user {}: {}", url, msg.user, e);
            if let Err(send_err) = deps
                .messenger
                .send_text(msg.user, &format!("🚫 Error processing the link: {}", e))
                .await
            {
                log::error!("Failed to notify user {}: {}", msg.user, send_err);
            }
        }
    });
}

/// Extracts a video and sends it as a streamable attachment.
///
/// Rejections (too large, private, removed) are answered here; anything else
/// is returned to the caller.
pub async fn download_external(deps: &HandlerDeps, msg: &IncomingMessage, url: &Url) -> Result<(), HandlerError> {
    let media = match deps
        .extractor
        .extract(url, config::extract::MAX_FILE_SIZE_BYTES)
        .await
    {
        Ok(media) => media,
        Err(e) if e.is_rejection() => {
            log::warn!("yt-dlp rejected {} for user {}: {}", url, msg.user, e);
            deps.messenger
                .send_text(
                    msg.user,
                    "🚫 Error: the video is too large (>50 MB), private or removed.",
                )
                .await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let file = TransientFile::new(media.path.clone());
    deps.messenger
        .send_video(msg.user, file.path(), &format!("✅ {}", media.title))
        .await?;
    if let Err(e) = file.remove().await {
        log::warn!("Failed to remove sent video {}: {}", media.path.display(), e);
    }

    delete_request(deps, msg).await;
    Ok(())
}
