//! Entry point for starting a batch on behalf of a user.

use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::progress;
use super::registry::{RegistrationGuard, TaskHandle, TaskRegistry};
use super::worker::{BatchOutcome, BatchWorker};
use crate::core::types::{Batch, MessageRef, UserId};
use crate::telegram::messenger::{Messenger, MessengerError};

/// Reasons a batch was not started.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The user already has a live batch
    #[error("a batch is already running for this user")]
    Busy,

    /// Nothing to download
    #[error("no tracks found in '{source_name}'")]
    Empty { source_name: String },

    /// The status notice could not be sent
    #[error("failed to send batch notice: {0}")]
    Messaging(#[from] MessengerError),
}

/// A batch that was accepted and is now running in the background.
#[derive(Debug)]
pub struct Accepted {
    pub task_id: Uuid,
    pub status: MessageRef,
    pub join: JoinHandle<BatchOutcome>,
}

pub struct BatchLauncher {
    registry: Arc<TaskRegistry>,
    worker: Arc<BatchWorker>,
    messenger: Arc<dyn Messenger>,
}

impl BatchLauncher {
    pub fn new(registry: Arc<TaskRegistry>, worker: Arc<BatchWorker>, messenger: Arc<dyn Messenger>) -> Self {
        Self {
            registry,
            worker,
            messenger,
        }
    }

    pub fn registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }

    /// Validates preconditions and starts `batch` for `user`.
    ///
    /// Returns as soon as the worker is spawned; the caller never waits for
    /// the batch itself.
    pub async fn launch(&self, user: UserId, batch: Batch) -> Result<Accepted, LaunchError> {
        if self.registry.is_busy(user) {
            log::info!("Batch refused for user {}: already running", user);
            return Err(LaunchError::Busy);
        }
        if batch.is_empty() {
            return Err(LaunchError::Empty {
                source_name: batch.source_name().to_string(),
            });
        }

        let notice = progress::preparing_text(batch.total(), batch.source_name());
        let status = self.messenger.send_text(user, &notice).await?;

        if let Err(e) = self.messenger.pin(status).await {
            log::warn!("Failed to pin batch status for user {}: {}", user, e);
        }

        let handle = TaskHandle::new(status);
        let task_id = handle.id();
        if !self.registry.try_register(user, handle.clone()) {
            log::info!("Batch for user {} lost the registration race", user);
            if let Err(e) = self.messenger.delete(status).await {
                log::warn!("Failed to delete orphaned batch notice for user {}: {}", user, e);
            }
            return Err(LaunchError::Busy);
        }

        let guard = RegistrationGuard::new(Arc::clone(&self.registry), user, handle);
        let worker = Arc::clone(&self.worker);
        let join = tokio::spawn(async move { worker.run(user, batch, status, guard).await });

        Ok(Accepted { task_id, status, join })
    }
}
