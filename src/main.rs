use anyhow::Result;
use dotenvy::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use teloxide::prelude::*;

use tunedrop::catalog::{Catalog, YandexMusicClient};
use tunedrop::cli::{download_track, Cli, Commands};
use tunedrop::core::config::{self, CatalogConfig};
use tunedrop::core::{init_logger, Config};
use tunedrop::download::{BatchLauncher, BatchWorker, CatalogFetcher, ItemFetcher, TaskRegistry, YtDlpExtractor};
use tunedrop::telegram::{
    create_bot, schema, setup_bot_commands, AccessGuard, HandlerDeps, Messenger, TelegramMessenger,
};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, configuration, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Log panics from spawned tasks instead of losing them on stderr
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    // Load environment variables from .env if present
    let _ = dotenv();

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Track { id, output }) => run_track_download(id, output).await,
        Some(Commands::Run) => run_bot().await,
        None => {
            log::info!("No command specified, running bot in default mode");
            run_bot().await
        }
    }
}

/// Run the `track` command
async fn run_track_download(id: String, output: Option<PathBuf>) -> Result<()> {
    let catalog_config = CatalogConfig::from_env()?;
    let catalog = YandexMusicClient::new(catalog_config.api_url, catalog_config.token)?;
    let output_dir = output.unwrap_or_else(|| PathBuf::from("."));

    let path = download_track(&catalog, &id, &output_dir).await?;
    println!("{}", path.display());
    Ok(())
}

/// Wire collaborators together and run the dispatcher until Ctrl+C
async fn run_bot() -> Result<()> {
    let config = Config::from_env()?;
    log::info!(
        "Starting bot: {} allowed users, download dir {}, item delay {:?}",
        config.allowed_users.len(),
        config.download_dir.display(),
        config.item_delay
    );

    let Config {
        bot_token,
        catalog: catalog_config,
        allowed_users,
        reject_sticker_id,
        download_dir,
        item_delay,
    } = config;

    let bot = create_bot(&bot_token)?;
    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let messenger: Arc<dyn Messenger> = Arc::new(TelegramMessenger::new(bot.clone()));
    let catalog: Arc<dyn Catalog> = Arc::new(YandexMusicClient::new(catalog_config.api_url, catalog_config.token)?);
    let fetcher: Arc<dyn ItemFetcher> = Arc::new(CatalogFetcher::new(
        Arc::clone(&catalog),
        Arc::clone(&messenger),
        download_dir.join("tracks"),
    ));
    let extractor = Arc::new(YtDlpExtractor::new(config::YTDL_BIN.clone(), download_dir.join("videos")));

    let registry = Arc::new(TaskRegistry::new());
    let worker = Arc::new(BatchWorker::new(Arc::clone(&messenger), Arc::clone(&fetcher), item_delay));
    let launcher = Arc::new(BatchLauncher::new(registry, worker, Arc::clone(&messenger)));
    let access = Arc::new(AccessGuard::new(allowed_users, reject_sticker_id, Arc::clone(&messenger)));

    let deps = HandlerDeps::new(messenger, catalog, fetcher, extractor, launcher, access);

    log::info!("Bot started, polling for updates");
    Dispatcher::builder(bot, schema(deps))
        .dependencies(DependencyMap::new())
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}
