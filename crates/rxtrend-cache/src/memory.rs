//! In-memory cache implementation.

use async_trait::async_trait;
use polars::prelude::DataFrame;
use rxtrend_core::{Result, ResultCache};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Simple in-memory cache for testing and development.
///
/// Results are stored in a `RwLock`-protected `HashMap` and are lost when
/// the cache is dropped. DataFrames are cloned on get/put operations.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, DataFrame>>,
}

impl InMemoryCache {
    /// Create a new empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultCache for InMemoryCache {
    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &str) -> Result<Option<DataFrame>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(df) => {
                debug!("Cache hit");
                Ok(Some(df.clone()))
            }
            None => {
                debug!("Cache miss");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, data), fields(key = %key, rows = data.height()))]
    async fn put(&self, key: &str, data: &DataFrame) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), data.clone());
        debug!("Cached {} rows", data.height());
        Ok(())
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn invalidate(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write().await;
        Ok(entries.remove(key).is_some())
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        debug!("Cleared all cache entries");
        Ok(())
    }
}
