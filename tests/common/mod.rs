//! Common test utilities
//!
//! Scripted collaborators shared across the integration tests.

#![allow(dead_code)]

pub mod catalog;
pub mod extractor;
pub mod fetcher;
pub mod messenger;

pub use catalog::ScriptedCatalog;
pub use extractor::ScriptedExtractor;
pub use fetcher::ScriptedFetcher;
pub use messenger::{Event, RecordingMessenger};

use tunedrop::core::types::UserId;

/// Allowed test user
pub const OWNER: UserId = UserId(123456789);

/// A user outside the allow-list
pub const STRANGER: UserId = UserId(987654321);
