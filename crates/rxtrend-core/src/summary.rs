//! Year-over-year summary computation.
//!
//! This module mirrors the remote aggregation locally: given per-year item
//! counts (or raw monthly rows), it computes the same `items_<year>` and
//! `perc_increase_<year>` values the rendered SQL produces.

use polars::prelude::{Column, DataFrame};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, RxError};
use crate::types::MonthlyItems;
use crate::window::SeasonWindow;

/// Rounds to two decimal places.
#[must_use]
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Percentage increase from `baseline` to `current`, rounded to two
/// decimal places.
///
/// Returns `None` when the baseline is zero: the ratio is undefined and is
/// reported as a null value rather than an infinity or a panic.
#[must_use]
pub fn pct_increase(current: i64, baseline: i64) -> Option<f64> {
    if baseline == 0 {
        return None;
    }
    Some(round2(100.0 * (current as f64 / baseline as f64 - 1.0)))
}

/// Per-year item totals with year-over-year percentage increases.
///
/// The increase for a year is relative to the preceding year's total; the
/// first year of the range has no increase. Years are kept in ascending
/// order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    items: BTreeMap<i32, i64>,
}

impl TrendSummary {
    /// Builds a summary from per-year totals.
    #[must_use]
    pub fn from_counts(counts: &[(i32, i64)]) -> Self {
        Self {
            items: counts.iter().copied().collect(),
        }
    }

    /// Builds a summary by aggregating monthly rows over a seasonal window.
    ///
    /// Rows outside the window (wrong months, or years outside the range)
    /// are ignored; years with no rows inside the window total zero. This
    /// is the local equivalent of the windowed `SUM(CASE ...)` columns.
    #[must_use]
    pub fn from_monthly(rows: &[MonthlyItems], window: &SeasonWindow) -> Self {
        let mut items: BTreeMap<i32, i64> = window.years().map(|y| (y, 0)).collect();
        for row in rows {
            if let Some(year) = window.year_of(row.month) {
                *items.entry(year).or_insert(0) += row.items;
            }
        }
        Self { items }
    }

    /// Total items for `year`, if the year is covered.
    #[must_use]
    pub fn items(&self, year: i32) -> Option<i64> {
        self.items.get(&year).copied()
    }

    /// Percentage increase of `year` over the preceding year.
    ///
    /// `None` when either year is missing or the baseline is zero.
    #[must_use]
    pub fn increase(&self, year: i32) -> Option<f64> {
        let current = self.items(year)?;
        let baseline = self.items(year - 1)?;
        pct_increase(current, baseline)
    }

    /// Years covered, in ascending order.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.items.keys().copied()
    }

    /// Renders the summary as a one-row table.
    ///
    /// Columns are `items_<year>` for every year followed by
    /// `perc_increase_<year>` for every year after the first, matching the
    /// column order of the remote query's result. Undefined increases are
    /// null cells.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.items.len() * 2);

        for (year, count) in &self.items {
            columns.push(Column::new(format!("items_{}", year).into(), vec![*count]));
        }
        for year in self.years().skip(1) {
            columns.push(Column::new(
                format!("perc_increase_{}", year).into(),
                vec![self.increase(year)],
            ));
        }

        DataFrame::new(columns).map_err(|e| RxError::Other(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_pct_increase_rounds_to_two_decimals() {
        assert_eq!(pct_increase(104, 100), Some(4.0));
        assert_eq!(pct_increase(106, 100), Some(6.0));
        // 1/3 increase rounds at the second decimal
        assert_eq!(pct_increase(4, 3), Some(33.33));
    }

    #[test]
    fn test_pct_increase_zero_baseline_is_null() {
        assert_eq!(pct_increase(104, 0), None);
        assert_eq!(pct_increase(0, 0), None);
    }

    #[test]
    fn test_pct_increase_can_be_negative() {
        assert_eq!(pct_increase(95, 100), Some(-5.0));
    }

    #[test]
    fn test_summary_from_counts() {
        let summary = TrendSummary::from_counts(&[(2016, 100), (2017, 104)]);

        assert_eq!(summary.items(2016), Some(100));
        assert_eq!(summary.increase(2017), Some(4.0));
        // First year has no baseline
        assert_eq!(summary.increase(2016), None);
    }

    #[test]
    fn test_summary_from_monthly_respects_window() {
        let window = SeasonWindow::default();
        let date = |y, m| NaiveDate::from_ymd_opt(y, m, 1).unwrap();

        let rows = vec![
            MonthlyItems::new(date(2016, 4), 40),
            MonthlyItems::new(date(2016, 9), 60),
            // Outside the April-September window
            MonthlyItems::new(date(2016, 12), 999),
            MonthlyItems::new(date(2017, 6), 104),
            // Outside the year range
            MonthlyItems::new(date(2015, 6), 999),
        ];

        let summary = TrendSummary::from_monthly(&rows, &window);
        assert_eq!(summary.items(2016), Some(100));
        assert_eq!(summary.items(2017), Some(104));
        assert_eq!(summary.items(2018), Some(0));
        assert_eq!(summary.increase(2017), Some(4.0));
        // 2018 had zero items, so 2019 has no defined baseline increase
        assert_eq!(summary.increase(2019), None);
    }

    #[test]
    fn test_to_dataframe_shape() {
        let summary = TrendSummary::from_counts(&[(2016, 100), (2017, 104), (2018, 0)]);
        let df = summary.to_dataframe().unwrap();

        assert_eq!(df.height(), 1);
        assert_eq!(df.get_column_names_str(), vec![
            "items_2016",
            "items_2017",
            "items_2018",
            "perc_increase_2017",
            "perc_increase_2018",
        ]);

        let increases = df.column("perc_increase_2017").unwrap();
        assert_eq!(increases.f64().unwrap().get(0), Some(4.0));
        // 2018 dropped to zero items: -100%, still defined
        let increases = df.column("perc_increase_2018").unwrap();
        assert_eq!(increases.f64().unwrap().get(0), Some(-100.0));
    }

    #[test]
    fn test_to_dataframe_null_increase() {
        let summary = TrendSummary::from_counts(&[(2016, 0), (2017, 104)]);
        let df = summary.to_dataframe().unwrap();

        let increases = df.column("perc_increase_2017").unwrap();
        assert_eq!(increases.f64().unwrap().get(0), None);
    }
}
