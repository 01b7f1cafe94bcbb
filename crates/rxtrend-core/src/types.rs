//! Core data types for prescribing data.
//!
//! This module defines the fundamental data structures:
//!
//! - [`BnfPrefix`] - Legacy BNF classification code prefix
//! - [`MonthlyItems`] - One month of prescribed item counts

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RxError;

/// A legacy BNF classification code prefix.
///
/// Used to filter the prescribing dataset with a `LIKE '<prefix>%'`
/// condition. Prefixes are plain digit strings: `"0403"` selects all
/// antidepressants (BNF section 4.3), `"040303"` only the SSRIs
/// (paragraph 4.3.3).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BnfPrefix(String);

impl BnfPrefix {
    /// BNF section 4.3 - all antidepressants.
    pub const ANTIDEPRESSANTS: &'static str = "0403";

    /// BNF paragraph 4.3.3 - selective serotonin reuptake inhibitors.
    pub const SSRIS: &'static str = "040303";

    /// Creates a new prefix, validating it is a non-empty digit string.
    pub fn new(s: impl Into<String>) -> Result<Self, RxError> {
        let s = s.into();
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RxError::InvalidParameter(format!(
                "BNF prefix must be a non-empty digit string, got {:?}",
                s
            )));
        }
        Ok(Self(s))
    }

    /// Returns the prefix as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BnfPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BnfPrefix {
    type Err = RxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// One month of raw prescribing data.
///
/// `month` is the first day of the month, matching the granularity of the
/// source dataset.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlyItems {
    /// First day of the month this count covers.
    pub month: NaiveDate,
    /// Number of prescribed items in that month.
    pub items: i64,
}

impl MonthlyItems {
    /// Creates a new monthly count.
    #[must_use]
    pub const fn new(month: NaiveDate, items: i64) -> Self {
        Self { month, items }
    }
}
