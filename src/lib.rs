//! Tunedrop - Telegram bot that downloads music in cancellable per-user batches
//!
//! Playlists, albums and liked tracks from the music catalog are delivered
//! track by track in a background batch per user, with throttled progress
//! reporting and `/cancel` support. Single tracks and external videos are
//! handled directly.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging and shared types
//! - `catalog`: Music catalog trait and the Yandex Music client
//! - `download`: Task registry, batch launcher/worker, track fetcher, video extractor
//! - `telegram`: Telegram bot integration and handlers

pub mod catalog;
pub mod cli;
pub mod core;
pub mod download;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult, Config};
pub use download::{BatchLauncher, BatchWorker, TaskRegistry};
pub use telegram::{schema, HandlerDeps};
