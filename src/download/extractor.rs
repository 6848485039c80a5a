//! Generic video extraction through yt-dlp.
//!
//! Used for links outside the music catalog (YouTube, TikTok, Instagram).
//! yt-dlp runs as a child process with a timeout so a hung download never
//! pins the caller.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use url::Url;
use uuid::Uuid;

use super::ytdlp_errors::{analyze_ytdlp_error, summarize};
use crate::core::config;
use crate::core::process::run_with_timeout;

/// Extraction errors.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The video cannot be served: too large, private, removed
    #[error("video rejected: {0}")]
    Rejected(String),

    /// yt-dlp failed for reasons unrelated to the video itself
    #[error("yt-dlp failed: {0}")]
    Failed(String),

    /// Spawning yt-dlp, its timeout, or local file handling
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ExtractError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, ExtractError::Rejected(_))
    }
}

/// A media file produced by an extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMedia {
    pub path: PathBuf,
    pub title: String,
}

/// Turns an arbitrary media URL into a local file.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Downloads a single video from `url` no larger than `max_size_bytes`.
    async fn extract(&self, url: &Url, max_size_bytes: u64) -> Result<ExtractedMedia, ExtractError>;
}

/// yt-dlp format selector: mp4 if one fits under the ceiling, otherwise anything that fits.
fn format_selector(max_size_bytes: u64) -> String {
    format!(
        "best[ext=mp4][filesize<={0}]/best[filesize<={0}]",
        max_size_bytes
    )
}

/// Title and final path printed by yt-dlp after the download.
fn parse_printed(stdout: &str) -> Option<(String, PathBuf)> {
    let lines: Vec<&str> = stdout.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    match lines.as_slice() {
        [.., title, path] => {
            let title = if *title == "NA" { "Untitled" } else { title };
            Some((title.to_string(), PathBuf::from(path)))
        }
        _ => None,
    }
}

/// [`Extractor`] backed by the yt-dlp binary.
#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    bin: String,
    output_dir: PathBuf,
    timeout: Duration,
}

impl YtDlpExtractor {
    pub fn new(bin: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            bin: bin.into(),
            output_dir: output_dir.into(),
            timeout: config::extract::ytdlp_timeout(),
        }
    }

    fn build_args(url: &Url, max_size_bytes: u64, output_template: &Path) -> Vec<String> {
        vec![
            "--no-playlist".to_string(),
            "--no-progress".to_string(),
            "-f".to_string(),
            format_selector(max_size_bytes),
            "--max-filesize".to_string(),
            max_size_bytes.to_string(),
            "-o".to_string(),
            output_template.to_string_lossy().into_owned(),
            "--print".to_string(),
            "after_move:title".to_string(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
            "--no-simulate".to_string(),
            url.to_string(),
        ]
    }
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    async fn extract(&self, url: &Url, max_size_bytes: u64) -> Result<ExtractedMedia, ExtractError> {
        fs_err::tokio::create_dir_all(&self.output_dir).await?;
        let template = self.output_dir.join(format!("{}.%(ext)s", Uuid::new_v4()));
        let args = Self::build_args(url, max_size_bytes, &template);

        log::debug!("Running {} for {}", self.bin, url);
        let output = run_with_timeout(Command::new(&self.bin).args(&args), self.timeout).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let error_type = analyze_ytdlp_error(&stderr);
            let summary = summarize(&stderr);
            log::warn!("yt-dlp failed for {} ({:?}): {}", url, error_type, summary);
            return Err(if error_type.is_rejection() {
                ExtractError::Rejected(summary)
            } else {
                ExtractError::Failed(summary)
            });
        }

        // With --max-filesize yt-dlp skips oversized files and still exits 0,
        // in which case the after_move prints never happen.
        let stdout = String::from_utf8_lossy(&output.stdout);
        let (title, path) = parse_printed(&stdout).ok_or_else(|| {
            ExtractError::Rejected("nothing was downloaded, the file exceeds the size limit".to_string())
        })?;

        let size = fs_err::tokio::metadata(&path).await?.len();
        if size > max_size_bytes {
            if let Err(e) = fs_err::tokio::remove_file(&path).await {
                log::warn!("Failed to remove oversized file {}: {}", path.display(), e);
            }
            return Err(ExtractError::Rejected(format!(
                "file is {} bytes, limit is {}",
                size, max_size_bytes
            )));
        }

        log::info!("Extracted '{}' ({} bytes) from {}", title, size, url);
        Ok(ExtractedMedia { path, title })
    }
}
