//! Telegram bot integration and handlers

pub mod access;
pub mod bot;
pub mod handlers;
pub mod links;
pub mod messenger;

// Re-exports for convenience
pub use access::AccessGuard;
pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::{schema, HandlerDeps, HandlerError, IncomingMessage};
pub use messenger::{Messenger, MessengerError, TelegramMessenger};
