//! Wires the diary store and product catalog to the configured backend and
//! the on-disk cache.

use std::sync::Arc;

use chrono::NaiveDate;
use diary_core::{
    seed_products, Cache, CacheError, DiaryStore, FileCache, OfflineRemote, Product,
    ProductCatalog, RemoteStore, RestRemote, SearchHistory,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;

pub const SEARCH_HISTORY_KEY: &str = "search-history";
pub const PRODUCTS_KEY: &str = "products";

/// Everything a command needs to read and change the diary.
pub struct Session {
    pub store: DiaryStore,
    pub catalog: ProductCatalog,
    cache: Arc<dyn Cache>,
}

impl Session {
    pub fn open(config: &Config, date: NaiveDate) -> Result<Self, Box<dyn std::error::Error>> {
        let remote: Arc<dyn RemoteStore> = match (&config.backend.url, &config.backend.api_key) {
            (Some(url), Some(key)) => Arc::new(RestRemote::new(url.as_str(), key.as_str())?),
            _ => Arc::new(OfflineRemote),
        };
        let cache: Arc<dyn Cache> = Arc::new(FileCache::new(config.data_dir.value.clone()));
        Ok(Self::with_parts(
            &config.user_id.value,
            date,
            remote,
            cache,
        ))
    }

    pub fn with_parts(
        user_id: &str,
        date: NaiveDate,
        remote: Arc<dyn RemoteStore>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        let queries: Vec<String> = load_json(cache.as_ref(), SEARCH_HISTORY_KEY).unwrap_or_default();
        let history = SearchHistory::from_queries(queries);
        let products: Vec<Product> =
            load_json(cache.as_ref(), PRODUCTS_KEY).unwrap_or_else(seed_products);

        let store = DiaryStore::open(user_id, date, remote.clone(), cache.clone())
            .with_search_history(history);
        let catalog = ProductCatalog::new(remote).with_seen(products);

        Self {
            store,
            catalog,
            cache,
        }
    }

    /// Writes search history and known products back to the cache.
    pub fn save(&self) -> Result<(), CacheError> {
        save_json(
            self.cache.as_ref(),
            SEARCH_HISTORY_KEY,
            &self.store.search_history(),
        )?;
        save_json(self.cache.as_ref(), PRODUCTS_KEY, &self.catalog.seen())
    }
}

fn load_json<T: DeserializeOwned>(cache: &dyn Cache, key: &str) -> Option<T> {
    let bytes = match cache.load(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read cache");
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring malformed cache value");
            None
        }
    }
}

fn save_json<T: Serialize + ?Sized>(cache: &dyn Cache, key: &str, value: &T) -> Result<(), CacheError> {
    let bytes = serde_json::to_vec(value)?;
    cache.save(key, &bytes)
}
