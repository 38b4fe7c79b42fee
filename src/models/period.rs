//! Calendar month periods.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A calendar month, the unit every monthly entitlement is computed for.
///
/// # Example
///
/// ```
/// use entitlement_engine::models::Period;
/// use chrono::NaiveDate;
///
/// let period = Period::new(2025, 12).unwrap();
/// assert_eq!(period.start(), NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
/// assert_eq!(period.end_exclusive(), NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
/// assert_eq!(period.to_string(), "2025-12");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period {
    /// The year.
    pub year: i32,
    /// The month, 1 to 12.
    pub month: u32,
}

impl Period {
    /// Creates a period, failing with `InvalidPeriod` when the pair does not
    /// name a calendar month chrono can represent.
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        let valid = (1..=12).contains(&month)
            && NaiveDate::from_ymd_opt(year, month, 1).is_some()
            && first_of_next_month(year, month).is_some();
        if valid {
            Ok(Self { year, month })
        } else {
            Err(EngineError::InvalidPeriod { year, month })
        }
    }

    /// The first day of the month.
    pub fn start(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// The first day of the following month.
    pub fn end_exclusive(&self) -> NaiveDate {
        first_of_next_month(self.year, self.month).unwrap_or(NaiveDate::MAX)
    }

    /// The given day of this month, if it exists.
    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    /// True when `date` falls inside the month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Every day of the month in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end_exclusive();
        self.start().iter_days().take_while(move |day| *day < end)
    }
}

fn first_of_next_month(year: i32, month: u32) -> Option<NaiveDate> {
    if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
