//! Yandex Music API client.
//!
//! Only the handful of endpoints the bot needs: track metadata, download
//! info, playlists, albums and the liked-tracks library.

use async_trait::async_trait;
use futures_util::StreamExt;
use md5::{Digest, Md5};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, ClientBuilder, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tokio::sync::OnceCell;

use super::{Catalog, CatalogError, TrackInfo, TrackList, Variant};
use crate::core::config;
use crate::core::types::ItemId;

/// Salt used by the storage servers to validate direct download links
const SIGN_SALT: &str = "XGRlBW9FXlekgbPrRHuSiA";

/// Title used for the liked-tracks batch
pub const FAVORITES_TITLE: &str = "Favorites";

/// Catalog ids come back as numbers or strings depending on the endpoint.
fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("unexpected id: {}", other))),
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct AccountStatus {
    account: Account,
}

#[derive(Debug, Deserialize)]
struct Account {
    uid: u64,
}

#[derive(Debug, Deserialize)]
struct TrackJson {
    #[serde(deserialize_with = "de_id")]
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    artists: Vec<ArtistJson>,
}

#[derive(Debug, Deserialize)]
struct ArtistJson {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DownloadInfoJson {
    codec: String,
    bitrate_in_kbps: u32,
    download_info_url: String,
}

#[derive(Debug, Deserialize)]
struct DirectLinkJson {
    host: String,
    path: String,
    ts: String,
    s: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistJson {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    tracks: Vec<PlaylistItemJson>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemJson {
    #[serde(default, deserialize_with = "de_opt_id")]
    id: Option<String>,
    #[serde(default)]
    track: Option<TrackJson>,
}

fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    de_id(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
struct AlbumJson {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    volumes: Vec<Vec<TrackJson>>,
}

#[derive(Debug, Deserialize)]
struct LikesJson {
    library: LibraryJson,
}

#[derive(Debug, Deserialize)]
struct LibraryJson {
    #[serde(default)]
    tracks: Vec<LikedTrackJson>,
}

#[derive(Debug, Deserialize)]
struct LikedTrackJson {
    #[serde(deserialize_with = "de_id")]
    id: String,
}

/// Builds the signed direct link for a resolved download location.
fn direct_link(scheme: &str, info: &DirectLinkJson) -> String {
    let path_tail = info.path.strip_prefix('/').unwrap_or(&info.path);
    let sign = hex::encode(Md5::digest(format!("{}{}{}", SIGN_SALT, path_tail, info.s).as_bytes()));
    format!("{}://{}/get-mp3/{}/{}{}", scheme, info.host, sign, info.ts, info.path)
}

/// [`Catalog`] implementation for Yandex Music.
pub struct YandexMusicClient {
    http: Client,
    base_url: String,
    token: SecretString,
    uid: OnceCell<u64>,
}

impl YandexMusicClient {
    /// Creates a client for `base_url` (normally [`config::DEFAULT_CATALOG_API_URL`]).
    pub fn new(base_url: impl Into<String>, token: SecretString) -> Result<Self, CatalogError> {
        let http = ClientBuilder::new().timeout(config::network::catalog_timeout()).build()?;
        Ok(Self::with_client(http, base_url, token))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>, token: SecretString) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            uid: OnceCell::new(),
        }
    }

    fn auth_header(&self) -> String {
        format!("OAuth {}", self.token.expose_secret())
    }

    async fn get_raw(&self, url: &str) -> Result<bytes::Bytes, CatalogError> {
        let response = self.http.get(url).header(AUTHORIZATION, self.auth_header()).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(CatalogError::Status {
                status,
                url: url.to_string(),
            });
        }
        Ok(response.bytes().await?)
    }

    async fn get_result<T: DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        let body = self.get_raw(&url).await?;
        let envelope: Envelope<T> =
            serde_json::from_slice(&body).map_err(|e| CatalogError::InvalidResponse(format!("{}: {}", path, e)))?;
        Ok(envelope.result)
    }

    async fn account_uid(&self) -> Result<u64, CatalogError> {
        self.uid
            .get_or_try_init(|| async {
                let status: AccountStatus = self.get_result("/account/status").await?;
                log::info!("Catalog account uid resolved: {}", status.account.uid);
                Ok::<u64, CatalogError>(status.account.uid)
            })
            .await
            .copied()
    }
}

#[async_trait]
impl Catalog for YandexMusicClient {
    async fn track(&self, id: &ItemId) -> Result<TrackInfo, CatalogError> {
        let tracks: Vec<TrackJson> = self.get_result(&format!("/tracks/{}", id)).await?;
        let track = tracks
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::NotFound(format!("track {}", id)))?;

        Ok(TrackInfo {
            id: ItemId::new(track.id),
            title: track.title.unwrap_or_else(|| "Untitled".to_string()),
            artists: track.artists.into_iter().map(|a| a.name).collect(),
        })
    }

    async fn download_variants(&self, id: &ItemId) -> Result<Vec<Variant>, CatalogError> {
        let infos: Vec<DownloadInfoJson> = self.get_result(&format!("/tracks/{}/download-info", id)).await?;
        Ok(infos
            .into_iter()
            .map(|info| Variant {
                codec: info.codec,
                bitrate_kbps: info.bitrate_in_kbps,
                handle: info.download_info_url,
            })
            .collect())
    }

    async fn download_variant(&self, variant: &Variant, dest: &Path) -> Result<(), CatalogError> {
        let mut info_url = Url::parse(&variant.handle)
            .map_err(|e| CatalogError::InvalidResponse(format!("bad download info url: {}", e)))?;
        info_url.query_pairs_mut().append_pair("format", "json");

        let body = self.get_raw(info_url.as_str()).await?;
        let location: DirectLinkJson = serde_json::from_slice(&body)
            .map_err(|e| CatalogError::InvalidResponse(format!("download info: {}", e)))?;
        let link = direct_link(info_url.scheme(), &location);

        log::debug!("Downloading {} kbps {} into {}", variant.bitrate_kbps, variant.codec, dest.display());

        let response = self.http.get(&link).send().await?;
        if !response.status().is_success() {
            return Err(CatalogError::Status {
                status: response.status(),
                url: link,
            });
        }

        let mut file = fs_err::tokio::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;
        Ok(())
    }

    async fn playlist(&self, owner: &str, kind: &str) -> Result<TrackList, CatalogError> {
        let playlist: PlaylistJson = self.get_result(&format!("/users/{}/playlists/{}", owner, kind)).await?;
        let item_ids = playlist
            .tracks
            .into_iter()
            .filter_map(|item| item.track.map(|t| t.id).or(item.id))
            .map(ItemId::new)
            .collect();

        Ok(TrackList {
            title: playlist.title.unwrap_or_else(|| format!("Playlist {}", kind)),
            item_ids,
        })
    }

    async fn album(&self, album_id: &str) -> Result<TrackList, CatalogError> {
        let album: AlbumJson = self.get_result(&format!("/albums/{}/with-tracks", album_id)).await?;
        let item_ids = album.volumes.into_iter().flatten().map(|t| ItemId::new(t.id)).collect();

        Ok(TrackList {
            title: album.title.unwrap_or_else(|| format!("Album {}", album_id)),
            item_ids,
        })
    }

    async fn liked_tracks(&self) -> Result<TrackList, CatalogError> {
        let uid = self.account_uid().await?;
        let likes: LikesJson = self.get_result(&format!("/users/{}/likes/tracks", uid)).await?;

        Ok(TrackList {
            title: FAVORITES_TITLE.to_string(),
            item_ids: likes.library.tracks.into_iter().map(|t| ItemId::new(t.id)).collect(),
        })
    }
}
