//! Command handler implementations (/start, /cancel, /favorites) and batch start

use super::types::{delete_request, HandlerDeps, HandlerError, IncomingMessage};
use crate::core::types::Batch;
use crate::download::{Accepted, LaunchError};

fn greeting(name: &str) -> String {
    format!(
        "Hello, master {}!\n\n\
         Send me a link to a track, album, playlist or video.\n\
         Or use /favorites to download your liked tracks.\n\
         To cancel a long download use /cancel.",
        name
    )
}

/// Handle /start command
pub async fn handle_start(deps: &HandlerDeps, msg: &IncomingMessage) -> Result<(), HandlerError> {
    if !deps.access.admit(msg.user).await {
        return Ok(());
    }

    deps.messenger.send_text(msg.user, &greeting(&msg.sender_name)).await?;
    delete_request(deps, msg).await;
    Ok(())
}

/// Handle /cancel command
pub async fn handle_cancel(deps: &HandlerDeps, msg: &IncomingMessage) -> Result<(), HandlerError> {
    if !deps.access.admit(msg.user).await {
        return Ok(());
    }

    let reply = if deps.registry().cancel(msg.user) {
        "✅ Download task cancelled."
    } else {
        "No active tasks to cancel."
    };
    deps.messenger.send_text(msg.user, reply).await?;
    delete_request(deps, msg).await;
    Ok(())
}

/// Handle /favorites command: every liked track as one batch
pub async fn handle_favorites(deps: &HandlerDeps, msg: &IncomingMessage) -> Result<(), HandlerError> {
    if !deps.access.admit(msg.user).await {
        return Ok(());
    }

    deps.messenger
        .send_text(msg.user, "Fetching your liked tracks...")
        .await?;

    match deps.catalog.liked_tracks().await {
        Ok(list) => {
            start_batch(deps, msg, Batch::new(list.item_ids, list.title)).await?;
        }
        Err(e) => {
            log::error!("Failed to fetch liked tracks for user {}: {}", msg.user, e);
            deps.messenger
                .send_text(msg.user, &format!("🚫 Failed to fetch your liked tracks: {}", e))
                .await?;
        }
    }
    Ok(())
}

/// Launches `batch` for the sender and answers refusals.
///
/// On acceptance the request message is deleted; the status notice takes its place.
pub async fn start_batch(
    deps: &HandlerDeps,
    msg: &IncomingMessage,
    batch: Batch,
) -> Result<Option<Accepted>, HandlerError> {
    match deps.launcher.launch(msg.user, batch).await {
        Ok(accepted) => {
            delete_request(deps, msg).await;
            Ok(Some(accepted))
        }
        Err(LaunchError::Busy) => {
            deps.messenger
                .send_text(
                    msg.user,
                    "The previous task is not finished yet. Use /cancel to stop it.",
                )
                .await?;
            Ok(None)
        }
        Err(LaunchError::Empty { source_name }) => {
            deps.messenger
                .send_text(msg.user, &format!("No tracks found in '{}'.", source_name))
                .await?;
            Ok(None)
        }
        Err(e @ LaunchError::Messaging(_)) => Err(e.into()),
    }
}
