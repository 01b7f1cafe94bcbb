//! Cache trait for storing fetched query results.
//!
//! This module defines the [`ResultCache`] trait that provides a unified
//! interface for caching tabular query results under caller-supplied keys.

use async_trait::async_trait;
use polars::prelude::DataFrame;

use crate::error::Result;

/// Trait for caching fetched query results.
///
/// Keys are caller-supplied names, typically relative file paths such as
/// `"data/adp_df.csv"`. A key identifies exactly one result; the cache does
/// not associate keys with the query that produced them, and stored entries
/// are never revalidated.
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Retrieves a cached result.
    ///
    /// Returns `Ok(Some(df))` on a hit, `Ok(None)` when nothing is stored
    /// under `key`.
    async fn get(&self, key: &str) -> Result<Option<DataFrame>>;

    /// Stores a result under `key`, replacing any previous entry.
    async fn put(&self, key: &str, data: &DataFrame) -> Result<()>;

    /// Removes the entry stored under `key`.
    ///
    /// Returns `true` if an entry was removed.
    async fn invalidate(&self, key: &str) -> Result<bool>;

    /// Clears all cached results.
    async fn clear(&self) -> Result<()>;
}
