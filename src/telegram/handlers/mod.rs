//! Telegram bot handler tree configuration
//!
//! Handlers work on [`IncomingMessage`] and [`HandlerDeps`] only, so tests
//! can drive them with mock collaborators. The dispatcher schema adapts
//! teloxide updates to that shape.

mod commands;
mod messages;
mod schema;
mod types;

pub use commands::{handle_cancel, handle_favorites, handle_start, start_batch};
pub use messages::{download_external, handle_text};
pub use schema::schema;
pub use types::{HandlerDeps, HandlerError, IncomingMessage};
