//! Executor trait for running queries against a remote service.
//!
//! This module defines [`QueryExecutor`], the abstraction over the remote
//! analytic query service. The service is an opaque collaborator: it is
//! handed a SQL string and returns a tabular result set.

use async_trait::async_trait;
use polars::prelude::DataFrame;
use std::fmt::Debug;

use crate::error::Result;

/// A remote analytic query execution service.
///
/// Implementations submit the statement to their backend and return the
/// result set as a `DataFrame`, preserving the column order of the query. A
/// failed execution is fatal to the caller: there is no retry or partial
/// result.
#[async_trait]
pub trait QueryExecutor: Send + Sync + Debug {
    /// Returns the name of this executor (e.g., "BigQuery").
    fn name(&self) -> &str;

    /// Returns a description of this executor.
    fn description(&self) -> &str;

    /// Executes a query and returns its result set.
    async fn run_query(&self, sql: &str) -> Result<DataFrame>;
}
