//! Handler types and dependencies

use std::sync::Arc;

use teloxide::types::Message;

use crate::catalog::Catalog;
use crate::core::types::{MessageRef, UserId};
use crate::download::{BatchLauncher, Extractor, ItemFetcher, TaskRegistry};
use crate::telegram::access::AccessGuard;
use crate::telegram::messenger::Messenger;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub messenger: Arc<dyn Messenger>,
    pub catalog: Arc<dyn Catalog>,
    pub fetcher: Arc<dyn ItemFetcher>,
    pub extractor: Arc<dyn Extractor>,
    pub launcher: Arc<BatchLauncher>,
    pub access: Arc<AccessGuard>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(
        messenger: Arc<dyn Messenger>,
        catalog: Arc<dyn Catalog>,
        fetcher: Arc<dyn ItemFetcher>,
        extractor: Arc<dyn Extractor>,
        launcher: Arc<BatchLauncher>,
        access: Arc<AccessGuard>,
    ) -> Self {
        Self {
            messenger,
            catalog,
            fetcher,
            extractor,
            launcher,
            access,
        }
    }

    pub fn registry(&self) -> &Arc<TaskRegistry> {
        self.launcher.registry()
    }
}

/// The parts of an incoming Telegram message the handlers act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub user: UserId,
    pub message_id: i32,
    pub text: String,
    pub sender_name: String,
}

impl IncomingMessage {
    /// Extract the sender and text from a Telegram message
    pub fn from_message(msg: &Message) -> Self {
        let user = msg
            .from
            .as_ref()
            .and_then(|u| i64::try_from(u.id.0).ok())
            .map(UserId)
            .unwrap_or(UserId(msg.chat.id.0));

        Self {
            user,
            message_id: msg.id.0,
            text: msg.text().unwrap_or_default().to_string(),
            sender_name: msg.from.as_ref().map(|u| u.full_name()).unwrap_or_default(),
        }
    }

    pub fn message_ref(&self) -> MessageRef {
        MessageRef::new(self.user, self.message_id)
    }
}

/// Deletes the user's request message; failures are only logged.
pub(super) async fn delete_request(deps: &HandlerDeps, msg: &IncomingMessage) {
    if let Err(e) = deps.messenger.delete(msg.message_ref()).await {
        log::warn!("Failed to delete message {} of user {}: {}", msg.message_id, msg.user, e);
    }
}
