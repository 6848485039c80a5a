//! Extractor that returns a prepared outcome instead of running yt-dlp.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;
use url::Url;

use tunedrop::download::{ExtractError, ExtractedMedia, Extractor};

pub enum Outcome {
    /// Writes a small file at the path and returns it
    File { path: PathBuf, title: String },
    Rejected,
    Failed,
}

pub struct ScriptedExtractor {
    outcome: Outcome,
    requests: Mutex<Vec<(Url, u64)>>,
}

impl ScriptedExtractor {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(Url, u64)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Extractor for ScriptedExtractor {
    async fn extract(&self, url: &Url, max_size_bytes: u64) -> Result<ExtractedMedia, ExtractError> {
        self.requests.lock().unwrap().push((url.clone(), max_size_bytes));
        match &self.outcome {
            Outcome::File { path, title } => {
                std::fs::write(path, b"video bytes")?;
                Ok(ExtractedMedia {
                    path: path.clone(),
                    title: title.clone(),
                })
            }
            Outcome::Rejected => Err(ExtractError::Rejected("ERROR: Private video".to_string())),
            Outcome::Failed => Err(ExtractError::Failed("ERROR: connection reset".to_string())),
        }
    }
}
