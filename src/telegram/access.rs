//! Allow-list access control for every entry point.

use std::collections::HashSet;
use std::sync::Arc;

use super::messenger::{Messenger, MessengerError};
use crate::core::types::UserId;

const REJECT_TEXT: &str = "You are not welcome here. Access denied.";
const FALLBACK_REJECT_TEXT: &str = "Access denied.";

/// Decides who may use the bot and answers everyone else.
pub struct AccessGuard {
    allowed: HashSet<UserId>,
    reject_sticker_id: Option<String>,
    messenger: Arc<dyn Messenger>,
}

impl AccessGuard {
    pub fn new(allowed: HashSet<UserId>, reject_sticker_id: Option<String>, messenger: Arc<dyn Messenger>) -> Self {
        Self {
            allowed,
            reject_sticker_id,
            messenger,
        }
    }

    pub fn is_allowed(&self, user: UserId) -> bool {
        self.allowed.contains(&user)
    }

    /// True if `user` may proceed. Otherwise the user is told off and false is returned.
    pub async fn admit(&self, user: UserId) -> bool {
        if self.is_allowed(user) {
            return true;
        }

        log::warn!("Access denied for user {}", user);
        if let Err(e) = self.reject(user).await {
            log::warn!("Failed to send rejection to user {}: {}", user, e);
            if let Err(e) = self.messenger.send_text(user, FALLBACK_REJECT_TEXT).await {
                log::error!("Failed to send fallback rejection to user {}: {}", user, e);
            }
        }
        false
    }

    async fn reject(&self, user: UserId) -> Result<(), MessengerError> {
        if let Some(sticker) = &self.reject_sticker_id {
            self.messenger.send_sticker(user, sticker).await?;
        }
        self.messenger.send_text(user, REJECT_TEXT).await?;
        Ok(())
    }
}
