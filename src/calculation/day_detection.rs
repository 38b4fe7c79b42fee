//! Day detection.
//!
//! Meal subsidy is earned Monday to Saturday; weekday overtime only
//! accrues Monday to Friday. Sunday earns neither.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// The type of day a date falls on.
///
/// # Example
///
/// ```
/// use entitlement_engine::calculation::DayType;
///
/// let day_type = DayType::Saturday;
/// assert_eq!(format!("{:?}", day_type), "Saturday");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    /// Monday through Friday.
    Weekday,
    /// Saturday.
    Saturday,
    /// Sunday.
    Sunday,
}

impl std::fmt::Display for DayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayType::Weekday => write!(f, "Weekday"),
            DayType::Saturday => write!(f, "Saturday"),
            DayType::Sunday => write!(f, "Sunday"),
        }
    }
}

/// Determines the day type for a given date.
///
/// # Example
///
/// ```
/// use entitlement_engine::calculation::{DayType, get_day_type};
/// use chrono::NaiveDate;
///
/// // 2026-02-02 is a Monday
/// assert_eq!(get_day_type(NaiveDate::from_ymd_opt(2026, 2, 2).unwrap()), DayType::Weekday);
/// // 2026-02-07 is a Saturday
/// assert_eq!(get_day_type(NaiveDate::from_ymd_opt(2026, 2, 7).unwrap()), DayType::Saturday);
/// ```
pub fn get_day_type(date: NaiveDate) -> DayType {
    match date.weekday() {
        Weekday::Sat => DayType::Saturday,
        Weekday::Sun => DayType::Sunday,
        _ => DayType::Weekday,
    }
}

/// True for Monday to Saturday, the days that earn meal subsidy.
pub fn is_lunch_workday(date: NaiveDate) -> bool {
    get_day_type(date) != DayType::Sunday
}

/// True for Monday to Friday, the days on which roster shifts accrue
/// weekday overtime.
pub fn is_overtime_weekday(date: NaiveDate) -> bool {
    get_day_type(date) == DayType::Weekday
}
