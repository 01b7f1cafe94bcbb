//! Trend query construction and SQL rendering.
//!
//! This module defines [`TrendQuery`], the parameterized aggregation that
//! compares prescribing volumes in the same seasonal window across
//! consecutive years, filtered by a BNF code prefix.

use serde::{Deserialize, Serialize};

use crate::types::BnfPrefix;
use crate::window::SeasonWindow;

/// Default source table for the aggregation.
pub const DEFAULT_TABLE: &str = "ebmdatalab.hscic.normalised_prescribing";

/// A seasonal year-over-year trend query.
///
/// Immutable once constructed: the builder methods consume and return the
/// query, and [`to_sql`](Self::to_sql) renders the final statement without
/// further parameterization.
///
/// The rendered SQL produces a single row with one `items_<year>` column per
/// year in the window and one `perc_increase_<year>` column per consecutive
/// year pair. Division uses `IEEE_DIVIDE` so a zero baseline yields a
/// non-finite value instead of failing the query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendQuery {
    prefix: BnfPrefix,
    window: SeasonWindow,
    table: String,
}

impl TrendQuery {
    /// Creates a query for the given BNF prefix over the default window
    /// (April through September, 2016 through 2020) and source table.
    #[must_use]
    pub fn new(prefix: BnfPrefix) -> Self {
        Self {
            prefix,
            window: SeasonWindow::default(),
            table: DEFAULT_TABLE.to_string(),
        }
    }

    /// Sets the seasonal comparison window.
    #[must_use]
    pub fn with_window(mut self, window: SeasonWindow) -> Self {
        self.window = window;
        self
    }

    /// Sets the source table.
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// The BNF prefix this query filters on.
    #[must_use]
    pub const fn prefix(&self) -> &BnfPrefix {
        &self.prefix
    }

    /// The seasonal window this query aggregates over.
    #[must_use]
    pub const fn window(&self) -> &SeasonWindow {
        &self.window
    }

    /// The source table this query reads from.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Windowed `SUM(CASE ...)` expression for one year.
    fn items_sum(&self, year: i32) -> String {
        let (start, end) = self.window.bounds(year);
        format!(
            "SUM(CASE WHEN month BETWEEN '{}' AND '{}' THEN items ELSE 0 END)",
            start, end
        )
    }

    /// Renders the query as a SQL statement.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let mut columns = Vec::new();

        for year in self.window.years() {
            columns.push(format!("{} AS items_{}", self.items_sum(year), year));
        }

        for year in self.window.years().skip(1) {
            columns.push(format!(
                "ROUND(100 * (IEEE_DIVIDE({}, {}) - 1), 2) AS perc_increase_{}",
                self.items_sum(year),
                self.items_sum(year - 1),
                year
            ));
        }

        format!(
            "SELECT\n{}\nFROM {}\nWHERE bnf_code LIKE '{}%'",
            columns.join(",\n"),
            self.table,
            self.prefix
        )
    }
}
