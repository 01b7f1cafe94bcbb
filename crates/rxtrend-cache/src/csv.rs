//! CSV file cache implementation.

use async_trait::async_trait;
use polars::prelude::{CsvReadOptions, CsvWriter, DataFrame, DataType, SerReader, SerWriter};
use rxtrend_core::{Result, ResultCache, RxError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// CSV-file-per-key cache rooted at a directory.
///
/// Each key is resolved as a path relative to the root (e.g.
/// `"data/adp_df.csv"`), so results land where a caller would expect to find
/// the exported file. A missing file is a miss; an existing file is read as
/// CSV and returned as-is, without any check that it matches the query that
/// originally produced it.
#[derive(Debug)]
pub struct CsvFileCache {
    root: PathBuf,
}

impl CsvFileCache {
    /// Create a new CSV file cache rooted at the given directory.
    ///
    /// The directory is created if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the root directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| RxError::Cache(e.to_string()))?;
        Ok(Self { root })
    }

    /// The directory this cache stores files under.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

/// Recover the dtype of all-null columns after a CSV read.
///
/// An entirely-empty CSV column carries no type information and is inferred
/// as `String`. The only all-null columns this cache stores are undefined
/// percentage increases, which are null float cells, so cast them back to
/// `Float64`.
fn restore_null_columns(mut df: DataFrame) -> Result<DataFrame> {
    if df.height() == 0 {
        return Ok(df);
    }

    let all_null: Vec<_> = df
        .get_columns()
        .iter()
        .filter(|c| c.dtype() == &DataType::String && c.null_count() == c.len())
        .map(|c| c.name().clone())
        .collect();

    for name in all_null {
        let cast = df
            .column(&name)
            .and_then(|c| c.cast(&DataType::Float64))
            .map_err(|e| RxError::Cache(e.to_string()))?;
        df.with_column(cast)
            .map_err(|e| RxError::Cache(e.to_string()))?;
    }

    Ok(df)
}

#[async_trait]
impl ResultCache for CsvFileCache {
    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &str) -> Result<Option<DataFrame>> {
        let path = self.resolve(key);
        if !path.exists() {
            debug!("Cache miss, no file at {}", path.display());
            return Ok(None);
        }

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.clone()))
            .map_err(|e| RxError::Cache(e.to_string()))?
            .finish()
            .map_err(|e| RxError::Cache(e.to_string()))?;
        let df = restore_null_columns(df)?;

        debug!("Cache hit, read {} rows from {}", df.height(), path.display());
        Ok(Some(df))
    }

    #[instrument(skip(self, data), fields(key = %key, rows = data.height()))]
    async fn put(&self, key: &str, data: &DataFrame) -> Result<()> {
        let path = self.resolve(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| RxError::Cache(e.to_string()))?;
        }

        let mut file = fs::File::create(&path).map_err(|e| RxError::Cache(e.to_string()))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut data.clone())
            .map_err(|e| RxError::Cache(e.to_string()))?;

        debug!("Wrote {} rows to {}", data.height(), path.display());
        Ok(())
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn invalidate(&self, key: &str) -> Result<bool> {
        let path = self.resolve(key);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|e| RxError::Cache(e.to_string()))?;
        debug!("Removed {}", path.display());
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        fs::remove_dir_all(&self.root).map_err(|e| RxError::Cache(e.to_string()))?;
        fs::create_dir_all(&self.root).map_err(|e| RxError::Cache(e.to_string()))?;
        debug!("Cleared cache root {}", self.root.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::Column;

    fn sample_df() -> DataFrame {
        DataFrame::new(vec![
            Column::new("items_2016".into(), vec![100i64]),
            Column::new("items_2017".into(), vec![104i64]),
            Column::new("perc_increase_2017".into(), vec![Some(4.0f64)]),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_miss_on_absent_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvFileCache::new(dir.path()).unwrap();

        let result = cache.get("data/adp_df.csv").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_round_trip_preserves_content_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvFileCache::new(dir.path()).unwrap();
        let df = sample_df();

        cache.put("data/adp_df.csv", &df).await.unwrap();

        // Parent directories were created and the file exists on disk
        assert!(dir.path().join("data/adp_df.csv").exists());

        let read_back = cache.get("data/adp_df.csv").await.unwrap().unwrap();
        assert_eq!(read_back.get_column_names_str(), df.get_column_names_str());
        assert!(read_back.equals_missing(&df));
    }

    #[tokio::test]
    async fn test_round_trip_keeps_null_increase_numeric() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvFileCache::new(dir.path()).unwrap();

        // Zero baseline: the increase column is entirely null
        let df = DataFrame::new(vec![
            Column::new("items_2016".into(), vec![0i64]),
            Column::new("items_2017".into(), vec![104i64]),
            Column::new("perc_increase_2017".into(), vec![None::<f64>]),
        ])
        .unwrap();

        cache.put("adp_df.csv", &df).await.unwrap();
        let read_back = cache.get("adp_df.csv").await.unwrap().unwrap();

        let increases = read_back.column("perc_increase_2017").unwrap();
        assert_eq!(increases.dtype(), &DataType::Float64);
        assert_eq!(increases.f64().unwrap().get(0), None);
        assert!(read_back.equals_missing(&df));
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvFileCache::new(dir.path()).unwrap();

        cache.put("adp_df.csv", &sample_df()).await.unwrap();

        let replacement = DataFrame::new(vec![Column::new(
            "items_2016".into(),
            vec![999i64],
        )])
        .unwrap();
        cache.put("adp_df.csv", &replacement).await.unwrap();

        let read_back = cache.get("adp_df.csv").await.unwrap().unwrap();
        assert!(read_back.equals_missing(&replacement));
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvFileCache::new(dir.path()).unwrap();

        cache.put("adp_df.csv", &sample_df()).await.unwrap();
        assert!(cache.invalidate("adp_df.csv").await.unwrap());
        assert!(!cache.invalidate("adp_df.csv").await.unwrap());
        assert!(cache.get("adp_df.csv").await.unwrap().is_none());

        cache.put("a.csv", &sample_df()).await.unwrap();
        cache.put("b/c.csv", &sample_df()).await.unwrap();
        cache.clear().await.unwrap();
        assert!(cache.get("a.csv").await.unwrap().is_none());
        assert!(cache.get("b/c.csv").await.unwrap().is_none());
    }
}
