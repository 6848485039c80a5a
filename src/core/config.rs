use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use secrecy::SecretString;
use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::types::UserId;

/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: tunedrop.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "tunedrop.log".to_string()));

/// Batch processing configuration
pub mod batch {
    use super::Duration;

    /// Pause after every track of a batch (seconds). Keeps request volume
    /// against the catalog and Telegram low.
    pub const ITEM_DELAY_SECS: u64 = 5;

    /// The status message is refreshed on every N-th track (and on the last one)
    pub const PROGRESS_STRIDE: usize = 3;

    /// Default inter-item delay duration
    pub fn item_delay() -> Duration {
        Duration::from_secs(ITEM_DELAY_SECS)
    }
}

/// Generic video extraction configuration
pub mod extract {
    use super::Duration;

    /// Largest file the bot will try to send (50 MB, standard Bot API limit)
    pub const MAX_FILE_SIZE_BYTES: u64 = 50 * 1024 * 1024;

    /// Timeout for a single yt-dlp run (in seconds)
    pub const YTDLP_TIMEOUT_SECS: u64 = 240;

    /// yt-dlp command timeout duration
    pub fn ytdlp_timeout() -> Duration {
        Duration::from_secs(YTDLP_TIMEOUT_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for catalog API calls (in seconds)
    pub const CATALOG_TIMEOUT_SECS: u64 = 30;

    /// Request timeout for Telegram calls (in seconds).
    /// Generous because audio and video uploads go through the same client.
    pub const TELEGRAM_TIMEOUT_SECS: u64 = 300;

    pub fn catalog_timeout() -> Duration {
        Duration::from_secs(CATALOG_TIMEOUT_SECS)
    }

    pub fn telegram_timeout() -> Duration {
        Duration::from_secs(TELEGRAM_TIMEOUT_SECS)
    }
}

/// Default Yandex Music API endpoint
pub const DEFAULT_CATALOG_API_URL: &str = "https://api.music.yandex.net";

/// Catalog endpoint and credentials.
///
/// Split out because the `track` subcommand needs nothing else.
#[derive(Debug)]
pub struct CatalogConfig {
    /// Catalog API base URL (YM_API_URL)
    pub api_url: String,
    /// Catalog OAuth token (YM_TOKEN)
    pub token: SecretString,
}

impl CatalogConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let token = non_empty("YM_TOKEN").ok_or_else(|| anyhow!("YM_TOKEN environment variable not set"))?;

        Ok(Self {
            api_url: non_empty("YM_API_URL").unwrap_or_else(|| DEFAULT_CATALOG_API_URL.to_string()),
            token: SecretString::from(token),
        })
    }
}

/// Runtime configuration, read once at startup and passed down explicitly.
#[derive(Debug)]
pub struct Config {
    /// Telegram bot token (BOT_TOKEN)
    pub bot_token: SecretString,
    /// Catalog endpoint and token
    pub catalog: CatalogConfig,
    /// Users allowed to talk to the bot (ALLOWED_TG_IDS)
    pub allowed_users: HashSet<UserId>,
    /// Sticker sent to rejected users (REJECT_STICKER_ID)
    pub reject_sticker_id: Option<String>,
    /// Directory for transient media files (DOWNLOAD_DIR)
    pub download_dir: PathBuf,
    /// Pause after every batch item (BATCH_ITEM_DELAY_SECS)
    pub item_delay: Duration,
}

impl Config {
    /// Builds the configuration from the process environment.
    ///
    /// `BOT_TOKEN`, `YM_TOKEN` and a non-empty `ALLOWED_TG_IDS` are required.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bot_token = non_empty("BOT_TOKEN")
            .or_else(|| non_empty("TELOXIDE_TOKEN"))
            .ok_or_else(|| anyhow!("BOT_TOKEN environment variable not set"))?;
        let catalog = CatalogConfig::from_lookup(&lookup)?;

        let allowed_users = parse_user_ids(&non_empty("ALLOWED_TG_IDS").unwrap_or_default());
        if allowed_users.is_empty() {
            return Err(anyhow!("ALLOWED_TG_IDS must list at least one Telegram user id"));
        }

        let item_delay = match non_empty("BATCH_ITEM_DELAY_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse::<u64>()
                    .with_context(|| format!("Invalid BATCH_ITEM_DELAY_SECS: {}", raw))?,
            ),
            None => batch::item_delay(),
        };

        Ok(Self {
            bot_token: SecretString::from(bot_token),
            catalog,
            allowed_users,
            reject_sticker_id: non_empty("REJECT_STICKER_ID"),
            download_dir: non_empty("DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            item_delay,
        })
    }
}

fn parse_user_ids(raw: &str) -> HashSet<UserId> {
    raw.split([',', ' ', '\n', '\t'])
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .map(UserId)
        .collect()
}
