//! In-memory catalog.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use tunedrop::catalog::{Catalog, CatalogError, TrackInfo, TrackList, Variant};
use tunedrop::core::types::ItemId;

#[derive(Default)]
pub struct ScriptedCatalog {
    tracks: HashMap<String, (TrackInfo, Vec<Variant>)>,
    lists: HashMap<String, TrackList>,
    downloads: Mutex<Vec<String>>,
}

pub fn variant(codec: &str, bitrate: u32, handle: &str) -> Variant {
    Variant {
        codec: codec.to_string(),
        bitrate_kbps: bitrate,
        handle: handle.to_string(),
    }
}

impl ScriptedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_track(mut self, id: &str, artist: &str, title: &str, variants: Vec<Variant>) -> Self {
        let info = TrackInfo {
            id: ItemId::new(id),
            title: title.to_string(),
            artists: vec![artist.to_string()],
        };
        self.tracks.insert(id.to_string(), (info, variants));
        self
    }

    /// Registers a list under `key`: `"playlist:<owner>:<kind>"`, `"album:<id>"` or `"likes"`
    pub fn with_list(mut self, key: &str, title: &str, ids: &[&str]) -> Self {
        self.lists.insert(
            key.to_string(),
            TrackList {
                title: title.to_string(),
                item_ids: ids.iter().map(|id| ItemId::new(*id)).collect(),
            },
        );
        self
    }

    /// Variant handles that were downloaded, in order
    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }

    fn list(&self, key: &str) -> Result<TrackList, CatalogError> {
        self.lists
            .get(key)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(key.to_string()))
    }
}

#[async_trait]
impl Catalog for ScriptedCatalog {
    async fn track(&self, id: &ItemId) -> Result<TrackInfo, CatalogError> {
        self.tracks
            .get(id.as_str())
            .map(|(info, _)| info.clone())
            .ok_or_else(|| CatalogError::NotFound(format!("track {}", id)))
    }

    async fn download_variants(&self, id: &ItemId) -> Result<Vec<Variant>, CatalogError> {
        self.tracks
            .get(id.as_str())
            .map(|(_, variants)| variants.clone())
            .ok_or_else(|| CatalogError::NotFound(format!("track {}", id)))
    }

    async fn download_variant(&self, variant: &Variant, dest: &Path) -> Result<(), CatalogError> {
        self.downloads.lock().unwrap().push(variant.handle.clone());
        tokio::fs::write(dest, variant.handle.as_bytes()).await?;
        Ok(())
    }

    async fn playlist(&self, owner: &str, kind: &str) -> Result<TrackList, CatalogError> {
        self.list(&format!("playlist:{}:{}", owner, kind))
    }

    async fn album(&self, album_id: &str) -> Result<TrackList, CatalogError> {
        self.list(&format!("album:{}", album_id))
    }

    async fn liked_tracks(&self) -> Result<TrackList, CatalogError> {
        self.list("likes")
    }
}
