//! Leave, vacation balance and cash-out models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::CashoutDefaults;
use crate::store::RecordId;

/// A leave request as filed by an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Employee name.
    pub employee: String,
    /// Leave type label, e.g. 特休.
    pub leave_type: String,
    /// Approval status label.
    pub status: String,
    /// First day of leave.
    pub start: NaiveDate,
    /// Last day of leave, when a range.
    pub end: Option<NaiveDate>,
    /// Hours requested.
    pub hours: Decimal,
}

/// The stored vacation balance for one employee and year.
///
/// Only `entitled_hours` is authoritative; the used and remaining figures
/// are convenience copies and are recomputed on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationYearRecord {
    /// Store id of the record.
    pub id: RecordId,
    /// Employee name.
    pub employee: String,
    /// Balance year.
    pub year: i32,
    /// Hours granted for the year.
    pub entitled_hours: Decimal,
    /// Stored copy of used hours.
    pub used_hours: Option<Decimal>,
    /// Stored copy of remaining hours.
    pub remaining_hours: Option<Decimal>,
}

/// Current vacation balance with used hours recomputed from approved leave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationSnapshot {
    /// Employee name.
    pub employee: String,
    /// Balance year.
    pub year: i32,
    /// Hours granted.
    pub entitled_hours: Decimal,
    /// Hours taken as approved annual leave.
    pub used_hours: Decimal,
    /// `max(0, entitled - used)`.
    pub remaining_hours: Decimal,
}

/// How unused leave converts to cash for one year.
///
/// # Example
///
/// ```
/// use entitlement_engine::models::CashoutRule;
/// use rust_decimal::Decimal;
///
/// let rule = CashoutRule {
///     year: 2026,
///     cap_days: Decimal::from(5),
///     hours_per_day: Decimal::from(8),
///     amount_per_hour: Decimal::from(125),
/// };
/// assert_eq!(rule.amount_per_day(), Decimal::from(1000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashoutRule {
    /// Rule year.
    pub year: i32,
    /// Maximum days that may be cashed out.
    pub cap_days: Decimal,
    /// Hours in one leave day.
    pub hours_per_day: Decimal,
    /// Cash value of one hour.
    pub amount_per_hour: Decimal,
}

impl CashoutRule {
    /// The rule used for a year that has none stored.
    pub fn fallback(year: i32, defaults: &CashoutDefaults) -> Self {
        let amount_per_hour = if defaults.hours_per_day > Decimal::ZERO {
            defaults.amount_per_day / defaults.hours_per_day
        } else {
            Decimal::ZERO
        };
        Self {
            year,
            cap_days: defaults.cap_days,
            hours_per_day: defaults.hours_per_day,
            amount_per_hour,
        }
    }

    /// Cash value of one day.
    pub fn amount_per_day(&self) -> Decimal {
        self.hours_per_day * self.amount_per_hour
    }
}

/// The result of converting remaining hours to cash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashoutResult {
    /// Remaining hours expressed in days, before rounding.
    pub remaining_days: Decimal,
    /// Days paid out after rounding and capping.
    pub cashout_days: Decimal,
    /// `cashout_days` times the day value.
    pub cashout_amount: Decimal,
}

/// Year-end cash-out for one employee: the balance, the rule applied and
/// the resulting payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearEndCashout {
    /// The employee's balance.
    pub snapshot: VacationSnapshot,
    /// The rule applied.
    pub rule: CashoutRule,
    /// Whether `rule` came from the store or the configured defaults.
    pub rule_is_default: bool,
    /// The payout.
    pub result: CashoutResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_rule_uses_configured_defaults() {
        let rule = CashoutRule::fallback(2026, &CashoutDefaults::default());
        assert_eq!(rule.hours_per_day, Decimal::from(8));
        assert_eq!(rule.cap_days, Decimal::from(5));
        assert_eq!(rule.amount_per_hour, Decimal::from(125));
        assert_eq!(rule.amount_per_day(), Decimal::from(1000));
    }

    #[test]
    fn test_fallback_with_zero_hours_has_zero_rate() {
        let defaults = CashoutDefaults {
            hours_per_day: Decimal::ZERO,
            ..CashoutDefaults::default()
        };
        let rule = CashoutRule::fallback(2026, &defaults);
        assert_eq!(rule.amount_per_hour, Decimal::ZERO);
    }
}
