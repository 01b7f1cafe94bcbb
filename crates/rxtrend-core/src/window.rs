//! Seasonal comparison window definitions.
//!
//! This module defines [`SeasonWindow`], the month span and year range used
//! to compare prescribing volumes between the same months of consecutive
//! years.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RxError};

/// A seasonal window compared across a range of years.
///
/// The window spans `start_month` through `end_month` within each year of
/// `first_year..=last_year`. Bounds mirror the SQL `BETWEEN` predicate the
/// query renders: inclusive of the first day of both boundary months.
///
/// The default window is April through September, 2016 through 2020.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSeasonWindow")]
pub struct SeasonWindow {
    start_month: u32,
    end_month: u32,
    first_year: i32,
    last_year: i32,
}

/// Unvalidated mirror of [`SeasonWindow`] for deserialization.
#[derive(Deserialize)]
struct RawSeasonWindow {
    start_month: u32,
    end_month: u32,
    first_year: i32,
    last_year: i32,
}

impl TryFrom<RawSeasonWindow> for SeasonWindow {
    type Error = RxError;

    fn try_from(raw: RawSeasonWindow) -> Result<Self> {
        Self::new(raw.start_month, raw.end_month, raw.first_year, raw.last_year)
    }
}

impl Default for SeasonWindow {
    fn default() -> Self {
        Self {
            start_month: 4,
            end_month: 9,
            first_year: 2016,
            last_year: 2020,
        }
    }
}

impl SeasonWindow {
    /// Creates a new window from a month span and an inclusive year range.
    pub fn new(start_month: u32, end_month: u32, first_year: i32, last_year: i32) -> Result<Self> {
        if !(1..=12).contains(&start_month) || !(1..=12).contains(&end_month) {
            return Err(RxError::InvalidParameter(format!(
                "Months must be in 1..=12, got {}..={}",
                start_month, end_month
            )));
        }
        if start_month > end_month {
            return Err(RxError::InvalidParameter(format!(
                "Start month {} is after end month {}",
                start_month, end_month
            )));
        }
        if first_year > last_year {
            return Err(RxError::InvalidParameter(format!(
                "First year {} is after last year {}",
                first_year, last_year
            )));
        }
        Ok(Self {
            start_month,
            end_month,
            first_year,
            last_year,
        })
    }

    /// Returns the years covered, in ascending order.
    pub fn years(&self) -> impl Iterator<Item = i32> + use<> {
        self.first_year..=self.last_year
    }

    /// First year of the range.
    #[must_use]
    pub const fn first_year(&self) -> i32 {
        self.first_year
    }

    /// Last year of the range.
    #[must_use]
    pub const fn last_year(&self) -> i32 {
        self.last_year
    }

    /// Inclusive date bounds of the window within `year`.
    ///
    /// Both bounds are the first day of a month, matching the source
    /// dataset's month keys.
    #[must_use]
    pub fn bounds(&self, year: i32) -> (NaiveDate, NaiveDate) {
        // Month numbers were validated on construction
        let start = NaiveDate::from_ymd_opt(year, self.start_month, 1)
            .unwrap_or(NaiveDate::MIN);
        let end = NaiveDate::from_ymd_opt(year, self.end_month, 1).unwrap_or(NaiveDate::MAX);
        (start, end)
    }

    /// Returns the year whose window contains `month`, if any.
    #[must_use]
    pub fn year_of(&self, month: NaiveDate) -> Option<i32> {
        let year = month.year();
        if year < self.first_year || year > self.last_year {
            return None;
        }
        let (start, end) = self.bounds(year);
        (month >= start && month <= end).then_some(year)
    }
}
