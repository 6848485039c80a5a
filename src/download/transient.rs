//! Scoped ownership of a downloaded media file.

use std::io;
use std::path::{Path, PathBuf};

/// A file that only lives for the duration of one delivery.
///
/// Removed by [`TransientFile::remove`] on success; if the delivery bails out
/// early the drop handler removes whatever partial file was left behind.
#[derive(Debug)]
pub struct TransientFile {
    path: PathBuf,
    armed: bool,
}

impl TransientFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            armed: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn remove(mut self) -> io::Result<()> {
        self.armed = false;
        fs_err::tokio::remove_file(&self.path).await
    }
}

impl Drop for TransientFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => log::debug!("Removed leftover file {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove leftover file {}: {}", self.path.display(), e),
        }
    }
}
