#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/openrxlab/rxtrend/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Caching implementations for prescribing-trend query results.
//!
//! This crate provides implementations of the [`ResultCache`] trait from
//! `rxtrend-core`:
//!
//! - [`CsvFileCache`] - Persistent CSV-file-per-key cache (default)
//! - [`InMemoryCache`] - Simple in-memory cache for testing
//! - [`NoopCache`] - No-op cache that doesn't store anything

/// CSV file cache implementation.
pub mod csv;
/// In-memory cache implementation.
pub mod memory;
/// No-op cache implementation.
pub mod noop;

// Re-export the trait for convenience
pub use rxtrend_core::ResultCache;

// Re-export implementations
pub use csv::CsvFileCache;
pub use memory::InMemoryCache;
pub use noop::NoopCache;
