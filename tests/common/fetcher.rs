//! Item fetcher with scripted failures and latency.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use tunedrop::catalog::CatalogError;
use tunedrop::core::types::{ItemId, UserId};
use tunedrop::download::{FetchError, ItemFetcher};

#[derive(Default)]
pub struct ScriptedFetcher {
    failing: HashSet<String>,
    latency: Duration,
    calls: Mutex<Vec<(ItemId, tokio::time::Instant)>>,
    delivered: Mutex<Vec<ItemId>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, ids: &[&str]) -> Self {
        self.failing.extend(ids.iter().map(|id| id.to_string()));
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Items in the order fetching started
    pub fn attempted(&self) -> Vec<ItemId> {
        self.calls.lock().unwrap().iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn attempt_times(&self) -> Vec<tokio::time::Instant> {
        self.calls.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }

    pub fn delivered(&self) -> Vec<ItemId> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl ItemFetcher for ScriptedFetcher {
    async fn fetch_and_deliver(&self, item: &ItemId, _user: UserId) -> Result<(), FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((item.clone(), tokio::time::Instant::now()));

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.failing.contains(item.as_str()) {
            return Err(FetchError::Catalog(CatalogError::NotFound(format!("track {}", item))));
        }
        self.delivered.lock().unwrap().push(item.clone());
        Ok(())
    }
}
