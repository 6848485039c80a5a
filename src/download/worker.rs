//! Batch worker: drives one batch to completion or cancellation.
//!
//! Tracks are processed strictly in order, one at a time, with a fixed pause
//! after each. Every await inside the loop races the task's cancellation
//! token, so a `/cancel` takes effect at the next suspension point. Cleanup
//! (final status, unpin, unregister) runs on every exit path.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::fetcher::ItemFetcher;
use super::progress::{self, ProgressState};
use super::registry::RegistrationGuard;
use crate::core::types::{Batch, MessageRef, UserId};
use crate::telegram::messenger::Messenger;

/// How a batch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    Completed { downloaded: usize, total: usize },
    Cancelled { downloaded: usize, total: usize },
}

impl BatchOutcome {
    pub fn downloaded(&self) -> usize {
        match self {
            BatchOutcome::Completed { downloaded, .. } | BatchOutcome::Cancelled { downloaded, .. } => *downloaded,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, BatchOutcome::Cancelled { .. })
    }
}

/// Marker for "the token fired while we were waiting".
struct Interrupted;

/// Runs `fut` unless `cancel` fires first. Cancellation wins ties.
async fn or_cancel<F: std::future::Future>(cancel: &CancellationToken, fut: F) -> Result<F::Output, Interrupted> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Interrupted),
        out = fut => Ok(out),
    }
}

pub struct BatchWorker {
    messenger: Arc<dyn Messenger>,
    fetcher: Arc<dyn ItemFetcher>,
    item_delay: Duration,
}

impl BatchWorker {
    pub fn new(messenger: Arc<dyn Messenger>, fetcher: Arc<dyn ItemFetcher>, item_delay: Duration) -> Self {
        Self {
            messenger,
            fetcher,
            item_delay,
        }
    }

    /// Processes `batch` for `user`, keeping `status` up to date.
    ///
    /// Consumes the registration guard: the registry entry is gone by the
    /// time this returns (or, if the future is dropped, when it is dropped).
    pub async fn run(&self, user: UserId, batch: Batch, status: MessageRef, guard: RegistrationGuard) -> BatchOutcome {
        let cancel = guard.handle().token();
        let task_id = guard.handle().id();
        let mut progress = ProgressState::new(batch.total(), batch.source_name());

        log::info!(
            "Batch {} started for user {}: {} tracks from '{}'",
            task_id,
            user,
            batch.total(),
            batch.source_name()
        );

        let interrupted = self.process(user, &batch, status, &cancel, &mut progress).await.is_err();

        let outcome = if interrupted {
            BatchOutcome::Cancelled {
                downloaded: progress.downloaded(),
                total: progress.total(),
            }
        } else {
            BatchOutcome::Completed {
                downloaded: progress.downloaded(),
                total: progress.total(),
            }
        };

        self.finish(status, &progress, outcome).await;
        guard.release();

        log::info!("Batch {} for user {} ended: {:?}", task_id, user, outcome);
        outcome
    }

    async fn process(
        &self,
        user: UserId,
        batch: &Batch,
        status: MessageRef,
        cancel: &CancellationToken,
        progress: &mut ProgressState,
    ) -> Result<(), Interrupted> {
        let total = batch.total();

        for (index, item) in batch.item_ids().iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(Interrupted);
            }

            if progress::should_report(index, total) {
                let text = progress.running_text();
                match or_cancel(cancel, self.messenger.edit_text(status, &text)).await? {
                    Ok(()) => {}
                    Err(e) if e.is_unchanged() => {}
                    Err(e) => log::warn!("Failed to update batch status for user {}: {}", user, e),
                }
            }

            match or_cancel(cancel, self.fetcher.fetch_and_deliver(item, user)).await? {
                Ok(()) => progress.record_success(),
                Err(e) => {
                    log::error!(
                        "Track {} failed for user {} [{}]: {}",
                        item,
                        user,
                        e.subcategory(),
                        e
                    );
                    let notice = progress::skip_text(item.as_str());
                    if let Err(send_err) = or_cancel(cancel, self.messenger.send_text(user, &notice)).await? {
                        log::warn!("Failed to send skip notice to user {}: {}", user, send_err);
                    }
                }
            }

            or_cancel(cancel, tokio::time::sleep(self.item_delay)).await?;
        }

        Ok(())
    }

    /// Final status text, then unpin. Never fails; problems are logged.
    async fn finish(&self, status: MessageRef, progress: &ProgressState, outcome: BatchOutcome) {
        let text = match outcome {
            BatchOutcome::Completed { .. } => progress.completed_text(),
            BatchOutcome::Cancelled { .. } => progress.cancelled_text(),
        };

        match self.messenger.edit_text(status, &text).await {
            Ok(()) => {}
            Err(e) if e.is_unchanged() => {}
            Err(e) => log::warn!("Failed to write final batch status for user {}: {}", status.user, e),
        }

        if let Err(e) = self.messenger.unpin(status).await {
            log::warn!("Failed to unpin batch status for user {}: {}", status.user, e);
        }
    }
}
