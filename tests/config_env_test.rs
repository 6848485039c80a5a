//! Configuration loading from the real process environment.

use secrecy::ExposeSecret;
use serial_test::serial;
use std::env;
use std::time::Duration;

use tunedrop::core::config::{CatalogConfig, Config, DEFAULT_CATALOG_API_URL};
use tunedrop::core::types::UserId;

const KEYS: [&str; 8] = [
    "BOT_TOKEN",
    "TELOXIDE_TOKEN",
    "YM_TOKEN",
    "YM_API_URL",
    "ALLOWED_TG_IDS",
    "REJECT_STICKER_ID",
    "DOWNLOAD_DIR",
    "BATCH_ITEM_DELAY_SECS",
];

fn clear_env() {
    for key in KEYS {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_from_env_reads_process_variables() {
    clear_env();
    env::set_var("BOT_TOKEN", "123:abc");
    env::set_var("YM_TOKEN", "ym-secret");
    env::set_var("ALLOWED_TG_IDS", "11, 22");
    env::set_var("BATCH_ITEM_DELAY_SECS", "2");

    let config = Config::from_env().unwrap();
    assert_eq!(config.bot_token.expose_secret(), "123:abc");
    assert_eq!(config.catalog.token.expose_secret(), "ym-secret");
    assert_eq!(config.catalog.api_url, DEFAULT_CATALOG_API_URL);
    assert!(config.allowed_users.contains(&UserId(22)));
    assert_eq!(config.item_delay, Duration::from_secs(2));
    assert_eq!(config.download_dir, env::temp_dir());

    clear_env();
}

#[test]
#[serial]
fn test_missing_bot_token_fails() {
    clear_env();
    env::set_var("YM_TOKEN", "ym-secret");
    env::set_var("ALLOWED_TG_IDS", "11");

    let err = Config::from_env().unwrap_err();
    assert!(err.to_string().contains("BOT_TOKEN"));

    // The track command only needs the catalog part.
    assert!(CatalogConfig::from_env().is_ok());

    clear_env();
}
