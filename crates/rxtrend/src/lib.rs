#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/openrxlab/rxtrend/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Cached prescribing-trend queries over remote analytic services.
//!
//! This crate re-exports the core types and cache implementations, and
//! provides a [`QueryRunner`] that combines registered executors with a
//! result cache.
//!
//! # Features
//!
//! - `bq` - BigQuery executor
//!
//! # Example
//!
//! ```rust,ignore
//! use rxtrend::{BnfPrefix, CsvFileCache, QueryRunner, TrendQuery};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> rxtrend::Result<()> {
//!     let cache = Arc::new(CsvFileCache::new("..")?);
//!     let runner = QueryRunner::new()
//!         .set_cache(cache)
//!         .with_bigquery("ebmdatalab", std::env::var("BQ_TOKEN").unwrap());
//!
//!     let query = TrendQuery::new(BnfPrefix::new(BnfPrefix::ANTIDEPRESSANTS)?);
//!     let df = runner.cached_read(&query, "data/adp_df.csv", true).await?;
//!     println!("{:?}", df);
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use rxtrend_core::*;

// Cache implementations
pub use rxtrend_cache::{CsvFileCache, InMemoryCache, NoopCache};

// Executors
#[cfg(feature = "bq")]
pub use rxtrend_bq::BqExecutor;

mod runner;
pub use runner::QueryRunner;
