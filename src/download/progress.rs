//! Batch progress state and the status texts built from it.

use crate::core::config::batch::PROGRESS_STRIDE;

/// Counters of one running batch.
///
/// Owned by the worker that runs the batch; `downloaded` only ever grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressState {
    downloaded: usize,
    total: usize,
    source_name: String,
}

impl ProgressState {
    pub fn new(total: usize, source_name: impl Into<String>) -> Self {
        Self {
            downloaded: 0,
            total,
            source_name: source_name.into(),
        }
    }

    pub fn downloaded(&self) -> usize {
        self.downloaded
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn record_success(&mut self) {
        self.downloaded = (self.downloaded + 1).min(self.total);
    }

    /// Status text while the batch is running.
    pub fn running_text(&self) -> String {
        format!(
            "⏳ Downloading '{}'\nProgress: {}/{}",
            self.source_name, self.downloaded, self.total
        )
    }

    pub fn completed_text(&self) -> String {
        format!(
            "✅ Download of '{}' completed: {}/{}",
            self.source_name, self.downloaded, self.total
        )
    }

    pub fn cancelled_text(&self) -> String {
        format!(
            "❌ Download of '{}' cancelled by user: {}/{}",
            self.source_name, self.downloaded, self.total
        )
    }
}

/// Notice sent (and pinned) when a batch is accepted.
pub fn preparing_text(total: usize, source_name: &str) -> String {
    format!("Preparing to download {} tracks from '{}'...", total, source_name)
}

/// One-line notice for a track the batch had to skip.
pub fn skip_text(item: &str) -> String {
    format!("🚫 Could not download track {}, skipping.", item)
}

/// Whether the status message is refreshed before processing item `index`.
///
/// Every [`PROGRESS_STRIDE`]-th item and the last one.
pub fn should_report(index: usize, total: usize) -> bool {
    index % PROGRESS_STRIDE == 0 || index + 1 == total
}
