//! Vacation balance and cash-out arithmetic.

use rust_decimal::Decimal;

use crate::models::CashoutResult;

/// Hours per day used when a rule gives a non-positive value.
pub const DEFAULT_HOURS_PER_DAY: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

/// Remaining vacation hours, never negative.
///
/// # Example
///
/// ```
/// use entitlement_engine::calculation::remaining_hours;
/// use rust_decimal::Decimal;
///
/// assert_eq!(remaining_hours(Decimal::from(56), Decimal::from(16)), Decimal::from(40));
/// assert_eq!(remaining_hours(Decimal::from(8), Decimal::from(16)), Decimal::ZERO);
/// ```
pub fn remaining_hours(entitled: Decimal, used: Decimal) -> Decimal {
    (entitled - used).max(Decimal::ZERO)
}

/// Converts remaining vacation hours to a cash payout.
///
/// # Arguments
///
/// * `remaining_hours` - Unused hours
/// * `hours_per_day` - Hours in one leave day; 8 is used when not positive
/// * `cap_days` - Maximum days paid out; negative caps count as zero
/// * `amount_per_day` - Cash value of one day
/// * `whole_days_only` - Drop partial days (floor) instead of rounding to
///   two decimal places
///
/// # Returns
///
/// A [`CashoutResult`] with the unrounded day count, the days paid and the
/// amount. The days paid never exceed the cap.
///
/// # Example
///
/// ```
/// use entitlement_engine::calculation::calculate_cashout;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let result = calculate_cashout(
///     Decimal::from(37),
///     Decimal::from(8),
///     Decimal::from(5),
///     Decimal::from(1000),
///     true,
/// );
/// assert_eq!(result.remaining_days, Decimal::from_str("4.625").unwrap());
/// assert_eq!(result.cashout_days, Decimal::from(4));
/// assert_eq!(result.cashout_amount, Decimal::from(4000));
/// ```
pub fn calculate_cashout(
    remaining_hours: Decimal,
    hours_per_day: Decimal,
    cap_days: Decimal,
    amount_per_day: Decimal,
    whole_days_only: bool,
) -> CashoutResult {
    let hours_per_day = if hours_per_day > Decimal::ZERO {
        hours_per_day
    } else {
        DEFAULT_HOURS_PER_DAY
    };
    let remaining_days = remaining_hours / hours_per_day;
    let raw_days = if whole_days_only {
        remaining_days.floor()
    } else {
        remaining_days.round_dp(2)
    };
    let cap = cap_days.max(Decimal::ZERO);
    let cashout_days = raw_days.min(cap);

    CashoutResult {
        remaining_days,
        cashout_days,
        cashout_amount: cashout_days * amount_per_day,
    }
}
