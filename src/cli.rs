use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::core::error::AppResult;
use crate::core::types::ItemId;
use crate::download::fetcher::resolve_track;

#[derive(Parser)]
#[command(name = "tunedrop")]
#[command(author, version, long_about = None)]
#[command(about = "Telegram bot that downloads tracks, albums and playlists in cancellable batches")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (default when no command is given)
    Run,

    /// Download a single track to disk without Telegram
    Track {
        /// Catalog track id
        id: String,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Fetches the best variant of track `id` into `output_dir`.
///
/// Same resolution and variant choice as the bot; returns the written path.
pub async fn download_track(catalog: &dyn Catalog, id: &str, output_dir: &Path) -> AppResult<PathBuf> {
    let id = id.trim();
    if id.is_empty() {
        return Err(crate::core::error::AppError::Validation("empty track id".to_string()));
    }

    let track = resolve_track(catalog, &ItemId::new(id)).await?;
    fs_err::tokio::create_dir_all(output_dir).await?;
    let dest = output_dir.join(&track.filename);

    catalog.download_variant(&track.variant, &dest).await?;
    log::info!(
        "Saved '{}' ({} kbps) to {}",
        track.info.title,
        track.variant.bitrate_kbps,
        dest.display()
    );
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_defaults_to_none() {
        let cli = Cli::try_parse_from(["tunedrop"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_track_command() {
        let cli = Cli::try_parse_from(["tunedrop", "track", "12345", "--output", "/tmp/out"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Track {
                id: "12345".to_string(),
                output: Some(PathBuf::from("/tmp/out")),
            })
        );
    }
}
