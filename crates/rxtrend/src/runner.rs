//! Cached query runner combining executors with a result cache.

use std::sync::Arc;

use polars::prelude::DataFrame;
use tracing::{debug, warn};

use rxtrend_core::{QueryExecutor, Result, ResultCache, RxError, TrendQuery};

/// Runner for trend queries with caching and executor fallback.
///
/// A `QueryRunner` holds one or more [`QueryExecutor`]s, tried in
/// registration order until one succeeds, and an optional [`ResultCache`]
/// consulted before any remote execution.
///
/// # Example
///
/// ```rust,ignore
/// use rxtrend::{BnfPrefix, CsvFileCache, QueryRunner, TrendQuery};
/// use std::sync::Arc;
///
/// let runner = QueryRunner::new()
///     .set_cache(Arc::new(CsvFileCache::new("..")?))
///     .with_bigquery("ebmdatalab", token);
///
/// let query = TrendQuery::new(BnfPrefix::new(BnfPrefix::SSRIS)?);
/// let df = runner.cached_read(&query, "data/ssri_df.csv", true).await?;
/// ```
#[derive(Default)]
pub struct QueryRunner {
    executors: Vec<Arc<dyn QueryExecutor>>,
    cache: Option<Arc<dyn ResultCache>>,
}

impl std::fmt::Debug for QueryRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryRunner")
            .field(
                "executors",
                &self.executors.iter().map(|e| e.name()).collect::<Vec<_>>(),
            )
            .field("cache", &self.cache.as_ref().map(|_| "configured"))
            .finish()
    }
}

impl QueryRunner {
    /// Create a new empty runner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new runner with a cache.
    #[must_use]
    pub fn with_cache(cache: Arc<dyn ResultCache>) -> Self {
        Self {
            cache: Some(cache),
            ..Default::default()
        }
    }

    /// Set the cache for this runner.
    #[must_use]
    pub fn set_cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Register a query executor.
    pub fn register(&mut self, executor: Arc<dyn QueryExecutor>) {
        debug!(executor = executor.name(), "Registering executor");
        self.executors.push(executor);
    }

    /// Run a query through the cache, fetching remotely on a miss.
    ///
    /// With `use_cache` set and an entry stored under `cache_key`, the
    /// cached table is returned without touching any executor; the entry is
    /// not checked against the query. Otherwise the query is executed
    /// remotely, the result is stored under `cache_key` (a storage failure
    /// is logged, not fatal), and returned. A cache read failure is treated
    /// as a miss.
    pub async fn cached_read(
        &self,
        query: &TrendQuery,
        cache_key: &str,
        use_cache: bool,
    ) -> Result<DataFrame> {
        if use_cache {
            if let Some(cache) = &self.cache {
                match cache.get(cache_key).await {
                    Ok(Some(cached)) => {
                        debug!(key = cache_key, "Cache hit for trend query");
                        return Ok(cached);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!(key = cache_key, error = %e, "Cache read failed, re-fetching");
                    }
                }
            }
        }

        let data = self.run(&query.to_sql()).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(cache_key, &data).await {
                warn!(key = cache_key, error = %e, "Failed to cache query result");
            }
        }

        Ok(data)
    }

    /// Execute raw SQL, trying executors in order until one succeeds.
    pub async fn run(&self, sql: &str) -> Result<DataFrame> {
        if self.executors.is_empty() {
            return Err(RxError::ExecutorNotConfigured(
                "No query executors registered".to_string(),
            ));
        }

        let mut last_error = None;
        for executor in &self.executors {
            debug!(executor = executor.name(), "Running query");

            match executor.run_query(sql).await {
                Ok(data) => return Ok(data),
                Err(e) => {
                    warn!(
                        executor = executor.name(),
                        error = %e,
                        "Executor failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| RxError::Other("All executors failed with no error".to_string())))
    }

    // Builder methods for easy setup with specific executors

    /// Add the BigQuery executor.
    #[cfg(feature = "bq")]
    #[must_use]
    pub fn with_bigquery(mut self, project: impl Into<String>, token: impl Into<String>) -> Self {
        self.register(Arc::new(rxtrend_bq::BqExecutor::new(project, token)));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use polars::prelude::Column;
    use rxtrend_core::BnfPrefix;
    use rxtrend_cache::{CsvFileCache, InMemoryCache};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Executor that serves a fixed table and counts invocations.
    #[derive(Debug, Default)]
    struct FixedExecutor {
        calls: AtomicUsize,
        fail: bool,
    }

    impl FixedExecutor {
        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn fixed_df() -> DataFrame {
        DataFrame::new(vec![
            Column::new("items_2016".into(), vec![100i64]),
            Column::new("items_2017".into(), vec![104i64]),
            Column::new("perc_increase_2017".into(), vec![4.0f64]),
        ])
        .unwrap()
    }

    #[async_trait]
    impl QueryExecutor for FixedExecutor {
        fn name(&self) -> &str {
            "Fixed"
        }

        fn description(&self) -> &str {
            "Serves a fixed table"
        }

        async fn run_query(&self, _sql: &str) -> Result<DataFrame> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RxError::Query("boom".to_string()));
            }
            Ok(fixed_df())
        }
    }

    fn antidepressants() -> TrendQuery {
        TrendQuery::new(BnfPrefix::new(BnfPrefix::ANTIDEPRESSANTS).unwrap())
    }

    #[tokio::test]
    async fn test_miss_fetches_and_populates_cache() {
        let executor = Arc::new(FixedExecutor::default());
        let cache = Arc::new(InMemoryCache::new());
        let mut runner = QueryRunner::with_cache(cache.clone());
        runner.register(executor.clone());

        let df = runner
            .cached_read(&antidepressants(), "adp_df.csv", true)
            .await
            .unwrap();

        assert_eq!(executor.calls(), 1);
        assert!(df.equals_missing(&fixed_df()));

        // The result landed in the cache under the given key
        let stored = cache.get("adp_df.csv").await.unwrap().unwrap();
        assert!(stored.equals_missing(&fixed_df()));
    }

    #[tokio::test]
    async fn test_hit_skips_executor() {
        let executor = Arc::new(FixedExecutor::default());
        let cache = Arc::new(InMemoryCache::new());
        cache.put("adp_df.csv", &fixed_df()).await.unwrap();

        let mut runner = QueryRunner::with_cache(cache);
        runner.register(executor.clone());

        let df = runner
            .cached_read(&antidepressants(), "adp_df.csv", true)
            .await
            .unwrap();

        assert_eq!(executor.calls(), 0);
        assert!(df.equals_missing(&fixed_df()));
    }

    #[tokio::test]
    async fn test_use_cache_false_always_fetches() {
        let executor = Arc::new(FixedExecutor::default());
        let cache = Arc::new(InMemoryCache::new());
        cache.put("adp_df.csv", &fixed_df()).await.unwrap();

        let mut runner = QueryRunner::with_cache(cache);
        runner.register(executor.clone());

        runner
            .cached_read(&antidepressants(), "adp_df.csv", false)
            .await
            .unwrap();

        assert_eq!(executor.calls(), 1);
    }

    #[tokio::test]
    async fn test_executor_failure_is_fatal() {
        let mut runner = QueryRunner::new();
        runner.register(Arc::new(FixedExecutor::failing()));

        let err = runner
            .cached_read(&antidepressants(), "adp_df.csv", true)
            .await
            .unwrap_err();
        assert!(matches!(err, RxError::Query(_)));
    }

    #[tokio::test]
    async fn test_executor_fallback() {
        let failing = Arc::new(FixedExecutor::failing());
        let working = Arc::new(FixedExecutor::default());

        let mut runner = QueryRunner::new();
        runner.register(failing.clone());
        runner.register(working.clone());

        let df = runner
            .cached_read(&antidepressants(), "adp_df.csv", true)
            .await
            .unwrap();

        assert_eq!(failing.calls(), 1);
        assert_eq!(working.calls(), 1);
        assert!(df.equals_missing(&fixed_df()));
    }

    #[tokio::test]
    async fn test_no_executors_is_an_error() {
        let runner = QueryRunner::new();
        let err = runner
            .cached_read(&antidepressants(), "adp_df.csv", true)
            .await
            .unwrap_err();
        assert!(matches!(err, RxError::ExecutorNotConfigured(_)));
    }

    #[tokio::test]
    async fn test_file_cache_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let executor = Arc::new(FixedExecutor::default());
        let cache = Arc::new(CsvFileCache::new(dir.path()).unwrap());

        let mut runner = QueryRunner::with_cache(cache);
        runner.register(executor.clone());

        let query = antidepressants();
        let first = runner.cached_read(&query, "data/adp_df.csv", true).await.unwrap();
        assert!(dir.path().join("data/adp_df.csv").exists());

        // Second read is served from the file, not the executor
        let second = runner.cached_read(&query, "data/adp_df.csv", true).await.unwrap();
        assert_eq!(executor.calls(), 1);
        assert!(second.equals_missing(&first));
    }
}
