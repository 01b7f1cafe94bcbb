#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/openrxlab/rxtrend/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for prescribing-trend data.
//!
//! This crate provides the foundational abstractions for working with
//! prescribing data:
//!
//! - [`TrendQuery`](query::TrendQuery) - Seasonal year-over-year aggregation query
//! - [`QueryExecutor`](executor::QueryExecutor) - Remote analytic service abstraction
//! - [`ResultCache`](cache::ResultCache) - Caching abstraction for query results
//! - [`TrendSummary`](summary::TrendSummary) - Local summary computation

/// Cache trait for storing fetched query results.
pub mod cache;
/// Error types for data operations.
pub mod error;
/// Executor trait for running queries against a remote service.
pub mod executor;
/// Trend query construction and SQL rendering.
pub mod query;
/// Year-over-year summary computation.
pub mod summary;
/// Core data types (BnfPrefix, MonthlyItems).
pub mod types;
/// Seasonal comparison window definitions.
pub mod window;

// Re-export commonly used items at crate root
pub use cache::ResultCache;
pub use error::{Result, RxError};
pub use executor::QueryExecutor;
pub use query::TrendQuery;
pub use summary::{TrendSummary, pct_increase, round2};
pub use types::{BnfPrefix, MonthlyItems};
pub use window::SeasonWindow;
