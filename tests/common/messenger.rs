//! Messenger that records every call instead of talking to Telegram.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tunedrop::core::types::{MessageRef, UserId};
use tunedrop::telegram::messenger::{AudioCaption, Messenger, MessengerError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Text { message: MessageRef, text: String },
    Audio { user: UserId, file: PathBuf, caption: AudioCaption },
    Video { user: UserId, file: PathBuf, caption: String },
    Sticker { user: UserId, sticker_id: String },
    Edit { message: MessageRef, text: String },
    Pin(MessageRef),
    Unpin(MessageRef),
    Delete(MessageRef),
}

/// Operations that can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Failing {
    Pin,
    Unpin,
    Sticker,
    Audio,
    Video,
    /// Every edit answers "message is not modified"
    EditUnchanged,
    /// Every edit fails with a transport error
    Edit,
}

#[derive(Default)]
pub struct RecordingMessenger {
    events: Mutex<Vec<Event>>,
    failing: Mutex<HashSet<Failing>>,
    next_id: AtomicI32,
    text_latency: Option<Duration>,
    edit_latency: Option<Duration>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI32::new(1000),
            ..Default::default()
        }
    }

    pub fn failing(self, op: Failing) -> Self {
        self.failing.lock().unwrap().insert(op);
        self
    }

    /// Every `send_text` takes `latency` before it is recorded
    pub fn with_text_latency(mut self, latency: Duration) -> Self {
        self.text_latency = Some(latency);
        self
    }

    /// Every `edit_text` takes `latency` before it is recorded
    pub fn with_edit_latency(mut self, latency: Duration) -> Self {
        self.edit_latency = Some(latency);
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Texts of all plain messages, in order
    pub fn texts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Text { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Texts of all edits, in order
    pub fn edits(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Edit { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    async fn lag(latency: Option<Duration>) {
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn fails(&self, op: Failing) -> bool {
        self.failing.lock().unwrap().contains(&op)
    }

    fn check(&self, op: Failing) -> Result<(), MessengerError> {
        if self.fails(op) {
            return Err(MessengerError::Other(format!("{:?} failed", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, user: UserId, text: &str) -> Result<MessageRef, MessengerError> {
        Self::lag(self.text_latency).await;
        let message = MessageRef::new(user, self.next_id.fetch_add(1, Ordering::SeqCst));
        self.record(Event::Text {
            message,
            text: text.to_string(),
        });
        Ok(message)
    }

    async fn send_audio(&self, user: UserId, file: &Path, caption: &AudioCaption) -> Result<(), MessengerError> {
        self.check(Failing::Audio)?;
        assert!(file.exists(), "audio file must exist while it is sent");
        self.record(Event::Audio {
            user,
            file: file.to_path_buf(),
            caption: caption.clone(),
        });
        Ok(())
    }

    async fn send_video(&self, user: UserId, file: &Path, caption: &str) -> Result<(), MessengerError> {
        self.check(Failing::Video)?;
        self.record(Event::Video {
            user,
            file: file.to_path_buf(),
            caption: caption.to_string(),
        });
        Ok(())
    }

    async fn send_sticker(&self, user: UserId, sticker_id: &str) -> Result<(), MessengerError> {
        self.check(Failing::Sticker)?;
        self.record(Event::Sticker {
            user,
            sticker_id: sticker_id.to_string(),
        });
        Ok(())
    }

    async fn edit_text(&self, message: MessageRef, text: &str) -> Result<(), MessengerError> {
        Self::lag(self.edit_latency).await;
        self.record(Event::Edit {
            message,
            text: text.to_string(),
        });
        if self.fails(Failing::EditUnchanged) {
            return Err(MessengerError::Unchanged);
        }
        self.check(Failing::Edit)
    }

    async fn pin(&self, message: MessageRef) -> Result<(), MessengerError> {
        self.check(Failing::Pin)?;
        self.record(Event::Pin(message));
        Ok(())
    }

    async fn unpin(&self, message: MessageRef) -> Result<(), MessengerError> {
        self.record(Event::Unpin(message));
        self.check(Failing::Unpin)
    }

    async fn delete(&self, message: MessageRef) -> Result<(), MessengerError> {
        self.record(Event::Delete(message));
        Ok(())
    }
}
