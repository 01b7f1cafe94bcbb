#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/openrxlab/rxtrend/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! BigQuery executor for prescribing-trend queries.
//!
//! This crate provides [`BqExecutor`], an implementation of the
//! [`QueryExecutor`] trait from `rxtrend-core` backed by the BigQuery
//! `jobs.query` REST endpoint.
//!
//! # Features
//!
//! - Synchronous query execution via the REST API
//! - Built-in rate limiting between requests
//! - Result sets parsed into polars `DataFrame`s, preserving column order
//!
//! # Example
//!
//! ```no_run
//! use rxtrend_bq::BqExecutor;
//! use rxtrend_core::{BnfPrefix, QueryExecutor, TrendQuery};
//!
//! # async fn example() -> rxtrend_core::Result<()> {
//! let executor = BqExecutor::new("ebmdatalab", std::env::var("BQ_TOKEN").unwrap());
//! let query = TrendQuery::new(BnfPrefix::new(BnfPrefix::ANTIDEPRESSANTS)?);
//!
//! let df = executor.run_query(&query.to_sql()).await?;
//! println!("Fetched {} rows", df.height());
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use polars::prelude::{Column, DataFrame};
use rxtrend_core::{QueryExecutor, Result, RxError};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::debug;

/// BigQuery REST API base URL.
const API_BASE_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";

/// Default rate limit delay in milliseconds.
const DEFAULT_RATE_LIMIT_MS: u64 = 500;

/// HTTP client timeout; analytic queries can take a while.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// BigQuery-backed query executor.
///
/// Implements [`QueryExecutor`] by POSTing rendered SQL to the
/// `projects/<project>/queries` endpoint with a bearer token.
#[derive(Debug)]
pub struct BqExecutor {
    client: reqwest::Client,
    project: String,
    token: String,
    rate_limit_ms: u64,
    last_request_time: AtomicU64,
}

impl BqExecutor {
    /// Create a new executor for a project with default settings.
    #[must_use]
    pub fn new(project: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_rate_limit(project, token, Duration::from_millis(DEFAULT_RATE_LIMIT_MS))
    }

    /// Create a new executor with a custom HTTP client.
    ///
    /// Uses the provided client for all HTTP requests. Rate limiting is
    /// still applied.
    #[must_use]
    pub fn with_client(
        project: impl Into<String>,
        token: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            client,
            project: project.into(),
            token: token.into(),
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            last_request_time: AtomicU64::new(0),
        }
    }

    /// Create a new executor with custom rate limiting.
    #[must_use]
    pub fn with_rate_limit(
        project: impl Into<String>,
        token: impl Into<String>,
        rate_limit: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            project: project.into(),
            token: token.into(),
            rate_limit_ms: rate_limit.as_millis() as u64,
            last_request_time: AtomicU64::new(0),
        }
    }

    /// Apply rate limiting before making a request.
    async fn apply_rate_limit(&self) {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let last = self.last_request_time.load(Ordering::Relaxed);
        let elapsed = now.saturating_sub(last);

        if elapsed < self.rate_limit_ms {
            let wait_time = self.rate_limit_ms - elapsed;
            debug!("Rate limiting: waiting {}ms", wait_time);
            sleep(Duration::from_millis(wait_time)).await;
        }

        self.last_request_time.store(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
            Ordering::Relaxed,
        );
    }

    /// Build the query endpoint URL for this project.
    fn build_query_url(&self) -> String {
        format!("{}/projects/{}/queries", API_BASE_URL, self.project)
    }

    /// Build the request body for a query.
    fn build_request(sql: &str) -> QueryRequest {
        QueryRequest {
            query: sql.to_string(),
            use_legacy_sql: false,
        }
    }

    /// Parse a query response into a DataFrame.
    ///
    /// Columns follow the response schema's order. INTEGER columns become
    /// i64, FLOAT/NUMERIC become f64, everything else stays a string; null
    /// cells become null values.
    fn parse_query_response(response: QueryResponse) -> Result<DataFrame> {
        if !response.job_complete {
            return Err(RxError::Query(
                "Query did not complete within the request deadline".to_string(),
            ));
        }

        if let Some(errors) = response.errors {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(RxError::Query(messages.join("; ")));
        }

        let schema = response
            .schema
            .ok_or_else(|| RxError::Parse("Missing schema in query response".to_string()))?;
        let rows = response.rows.unwrap_or_default();

        let mut columns = Vec::with_capacity(schema.fields.len());

        for (idx, field) in schema.fields.iter().enumerate() {
            let cells = rows.iter().map(|row| {
                row.f
                    .get(idx)
                    .and_then(|cell| cell.v.as_deref())
            });

            let name = field.name.as_str().into();
            let column = match field.field_type.as_str() {
                "INTEGER" | "INT64" => {
                    let values: Vec<Option<i64>> = cells
                        .map(|v| v.map(str::parse).transpose())
                        .collect::<std::result::Result<_, _>>()
                        .map_err(|e| {
                            RxError::Parse(format!("Bad integer in column {}: {}", field.name, e))
                        })?;
                    Column::new(name, values)
                }
                "FLOAT" | "FLOAT64" | "NUMERIC" | "BIGNUMERIC" => {
                    let values: Vec<Option<f64>> = cells
                        .map(|v| v.map(str::parse).transpose())
                        .collect::<std::result::Result<_, _>>()
                        .map_err(|e| {
                            RxError::Parse(format!("Bad float in column {}: {}", field.name, e))
                        })?;
                    Column::new(name, values)
                }
                _ => {
                    let values: Vec<Option<&str>> = cells.collect();
                    Column::new(name, values)
                }
            };
            columns.push(column);
        }

        DataFrame::new(columns).map_err(|e| RxError::Parse(e.to_string()))
    }
}

#[async_trait]
impl QueryExecutor for BqExecutor {
    fn name(&self) -> &str {
        "BigQuery"
    }

    fn description(&self) -> &str {
        "Google BigQuery analytic query service"
    }

    async fn run_query(&self, sql: &str) -> Result<DataFrame> {
        self.apply_rate_limit().await;

        let url = self.build_query_url();
        debug!("Running query against {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&Self::build_request(sql))
            .send()
            .await
            .map_err(|e| RxError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RxError::RateLimited {
                service: "BigQuery".to_string(),
                retry_after: Some(Duration::from_secs(60)),
            });
        }

        if response.status() == reqwest::StatusCode::UNAUTHORIZED
            || response.status() == reqwest::StatusCode::FORBIDDEN
        {
            return Err(RxError::AuthenticationFailed("BigQuery".to_string()));
        }

        if response.status() == reqwest::StatusCode::BAD_REQUEST {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "no response body".to_string());
            return Err(RxError::Query(body));
        }

        if !response.status().is_success() {
            return Err(RxError::Network(format!("HTTP {}", response.status())));
        }

        let query_response: QueryResponse = response
            .json()
            .await
            .map_err(|e| RxError::Parse(e.to_string()))?;

        Self::parse_query_response(query_response)
    }
}

// ============================================================================
// BigQuery API Request/Response Types
// ============================================================================

/// `jobs.query` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    query: String,
    use_legacy_sql: bool,
}

/// `jobs.query` response body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    job_complete: bool,
    schema: Option<TableSchema>,
    rows: Option<Vec<TableRow>>,
    errors: Option<Vec<ApiError>>,
}

#[derive(Debug, Deserialize)]
struct TableSchema {
    fields: Vec<TableField>,
}

#[derive(Debug, Deserialize)]
struct TableField {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
}

#[derive(Debug, Deserialize)]
struct TableRow {
    f: Vec<TableCell>,
}

#[derive(Debug, Deserialize)]
struct TableCell {
    v: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}
