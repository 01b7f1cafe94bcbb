//! No-op cache implementation.

use async_trait::async_trait;
use polars::prelude::DataFrame;
use rxtrend_core::{Result, ResultCache};
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// `get` always returns `Ok(None)` and `put` returns `Ok(())`. Useful for
/// disabling caching or testing code paths without cache hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ResultCache for NoopCache {
    async fn get(&self, _key: &str) -> Result<Option<DataFrame>> {
        trace!("NoopCache: get called, returning None");
        Ok(None)
    }

    async fn put(&self, _key: &str, _data: &DataFrame) -> Result<()> {
        trace!("NoopCache: put called, doing nothing");
        Ok(())
    }

    async fn invalidate(&self, _key: &str) -> Result<bool> {
        trace!("NoopCache: invalidate called, returning false");
        Ok(false)
    }

    async fn clear(&self) -> Result<()> {
        trace!("NoopCache: clear called, doing nothing");
        Ok(())
    }
}
