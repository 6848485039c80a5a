//! Chat transport seam.
//!
//! Everything the download core needs from Telegram goes through the
//! [`Messenger`] trait, so the batch worker and fetcher can run against a
//! recording mock in tests. [`TelegramMessenger`] is the production
//! implementation on top of teloxide.

use async_trait::async_trait;
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile, MessageId};
use teloxide::{ApiError, RequestError};
use thiserror::Error;

use crate::core::types::{MessageRef, UserId};

/// Messaging errors.
#[derive(Debug, Error)]
pub enum MessengerError {
    /// The edit would not change the message; safe to ignore.
    #[error("message content is unchanged")]
    Unchanged,

    /// Telegram API or network error
    #[error("Telegram error: {0}")]
    Telegram(RequestError),

    /// Transport-agnostic failure
    #[error("{0}")]
    Other(String),
}

impl MessengerError {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, MessengerError::Unchanged)
    }
}

impl From<RequestError> for MessengerError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Api(ApiError::MessageNotModified) => MessengerError::Unchanged,
            other => MessengerError::Telegram(other),
        }
    }
}

/// Tags attached to an audio upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioCaption {
    pub caption: String,
    pub performer: String,
    pub title: String,
}

/// Outgoing side of the chat transport.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends a plain text message and returns a reference to it.
    async fn send_text(&self, user: UserId, text: &str) -> Result<MessageRef, MessengerError>;

    /// Uploads a local file as an audio attachment.
    async fn send_audio(&self, user: UserId, file: &Path, caption: &AudioCaption) -> Result<(), MessengerError>;

    /// Uploads a local file as a streamable video attachment.
    async fn send_video(&self, user: UserId, file: &Path, caption: &str) -> Result<(), MessengerError>;

    async fn send_sticker(&self, user: UserId, sticker_id: &str) -> Result<(), MessengerError>;

    /// Replaces the text of a sent message. Fails with
    /// [`MessengerError::Unchanged`] when the text is identical.
    async fn edit_text(&self, message: MessageRef, text: &str) -> Result<(), MessengerError>;

    async fn pin(&self, message: MessageRef) -> Result<(), MessengerError>;

    async fn unpin(&self, message: MessageRef) -> Result<(), MessengerError>;

    async fn delete(&self, message: MessageRef) -> Result<(), MessengerError>;
}

/// [`Messenger`] backed by the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn chat(user: UserId) -> ChatId {
    ChatId(user.0)
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(&self, user: UserId, text: &str) -> Result<MessageRef, MessengerError> {
        let sent = self.bot.send_message(chat(user), text).await?;
        Ok(MessageRef::new(user, sent.id.0))
    }

    async fn send_audio(&self, user: UserId, file: &Path, caption: &AudioCaption) -> Result<(), MessengerError> {
        self.bot
            .send_audio(chat(user), InputFile::file(file.to_path_buf()))
            .caption(caption.caption.clone())
            .performer(caption.performer.clone())
            .title(caption.title.clone())
            .await?;
        Ok(())
    }

    async fn send_video(&self, user: UserId, file: &Path, caption: &str) -> Result<(), MessengerError> {
        self.bot
            .send_video(chat(user), InputFile::file(file.to_path_buf()))
            .caption(caption.to_string())
            .supports_streaming(true)
            .await?;
        Ok(())
    }

    async fn send_sticker(&self, user: UserId, sticker_id: &str) -> Result<(), MessengerError> {
        self.bot
            .send_sticker(chat(user), InputFile::file_id(FileId(sticker_id.to_string())))
            .await?;
        Ok(())
    }

    async fn edit_text(&self, message: MessageRef, text: &str) -> Result<(), MessengerError> {
        self.bot
            .edit_message_text(chat(message.user), MessageId(message.message_id), text)
            .await?;
        Ok(())
    }

    async fn pin(&self, message: MessageRef) -> Result<(), MessengerError> {
        self.bot
            .pin_chat_message(chat(message.user), MessageId(message.message_id))
            .disable_notification(true)
            .await?;
        Ok(())
    }

    async fn unpin(&self, message: MessageRef) -> Result<(), MessengerError> {
        self.bot
            .unpin_chat_message(chat(message.user))
            .message_id(MessageId(message.message_id))
            .await?;
        Ok(())
    }

    async fn delete(&self, message: MessageRef) -> Result<(), MessengerError> {
        self.bot
            .delete_message(chat(message.user), MessageId(message.message_id))
            .await?;
        Ok(())
    }
}
