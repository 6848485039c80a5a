use std::fmt;

/// Telegram user identifier.
///
/// The bot only talks in private chats, so this doubles as the chat id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalog identifier of a single downloadable track.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A message previously sent to (or received from) a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub user: UserId,
    pub message_id: i32,
}

impl MessageRef {
    pub fn new(user: UserId, message_id: i32) -> Self {
        Self { user, message_id }
    }
}

/// One user-initiated multi-track download job.
///
/// Immutable after creation; the worker that runs it owns it outright.
#[derive(Debug, Clone)]
pub struct Batch {
    item_ids: Vec<ItemId>,
    source_name: String,
}

impl Batch {
    pub fn new(item_ids: Vec<ItemId>, source_name: impl Into<String>) -> Self {
        Self {
            item_ids,
            source_name: source_name.into(),
        }
    }

    pub fn item_ids(&self) -> &[ItemId] {
        &self.item_ids
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn total(&self) -> usize {
        self.item_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.item_ids.is_empty()
    }
}
