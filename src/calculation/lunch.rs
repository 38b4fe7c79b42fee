//! Meal subsidy settlement.
//!
//! An employee earns a fixed per-diem for every Present or Late attendance
//! record dated Monday to Saturday in the month. The subsidy is settled
//! against the lunch orders charged to the employee in the same month.
//!
//! Attendance records are counted as they are; two records for the same
//! day count twice.

use rust_decimal::Decimal;

use crate::models::{AttendanceRecord, LunchOrder, LunchSettlement, Period, Provenance};

use super::day_detection::is_lunch_workday;

/// Default meal subsidy per eligible day.
pub const DEFAULT_LUNCH_PER_DIEM: Decimal = Decimal::from_parts(90, 0, 0, false, 0);

/// Counts attendance records that earn the meal subsidy in `period`.
///
/// A record counts when it falls inside the month, is dated Monday to
/// Saturday and has status Present or Late.
///
/// # Example
///
/// ```
/// use entitlement_engine::calculation::count_eligible_days;
/// use entitlement_engine::models::{AttendanceRecord, AttendanceStatus, Period};
/// use chrono::NaiveDate;
///
/// let period = Period::new(2026, 2).unwrap();
/// let records = vec![
///     // Monday
///     AttendanceRecord {
///         employee: "A".to_string(),
///         date: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
///         status: AttendanceStatus::Present,
///     },
///     // Sunday
///     AttendanceRecord {
///         employee: "A".to_string(),
///         date: NaiveDate::from_ymd_opt(2026, 2, 8).unwrap(),
///         status: AttendanceStatus::Present,
///     },
/// ];
/// assert_eq!(count_eligible_days(period, &records), 1);
/// ```
pub fn count_eligible_days(period: Period, records: &[AttendanceRecord]) -> u32 {
    let count = records
        .iter()
        .filter(|record| period.contains(record.date))
        .filter(|record| is_lunch_workday(record.date))
        .filter(|record| record.status.is_lunch_eligible())
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Settles the meal subsidy for one employee and month.
///
/// # Arguments
///
/// * `employee` - The employee settled
/// * `period` - The month settled
/// * `records` - The employee's attendance records
/// * `orders` - The employee's lunch orders
/// * `per_diem` - Subsidy per eligible day
///
/// # Returns
///
/// A computed [`LunchSettlement`] where `difference` is the subsidy minus
/// spending. Orders dated outside the month are ignored.
pub fn settle_lunch(
    employee: &str,
    period: Period,
    records: &[AttendanceRecord],
    orders: &[LunchOrder],
    per_diem: Decimal,
) -> LunchSettlement {
    let eligible_days = count_eligible_days(period, records);
    let entitlement_amount = Decimal::from(eligible_days) * per_diem;
    let spent_amount: Decimal = orders
        .iter()
        .filter(|order| period.contains(order.date))
        .map(|order| order.amount)
        .sum();

    LunchSettlement {
        employee: employee.to_string(),
        period,
        eligible_days,
        entitlement_amount,
        spent_amount,
        difference: entitlement_amount - spent_amount,
        provenance: Provenance::Computed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttendanceStatus;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn march() -> Period {
        Period::new(2026, 3).unwrap()
    }

    fn record(day: u32, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            employee: "B".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            status,
        }
    }

    fn order(month: u32, day: u32, amount: &str) -> LunchOrder {
        LunchOrder {
            employee: "B".to_string(),
            date: NaiveDate::from_ymd_opt(2026, month, day).unwrap(),
            amount: dec(amount),
        }
    }

    /// March 2026: 20 weekday Present, 2 Saturday Present, 3 Sunday Present,
    /// 1 weekday Leave.
    fn march_records() -> Vec<AttendanceRecord> {
        let weekdays = [
            2, 3, 4, 5, 6, 9, 10, 11, 12, 13, 16, 17, 18, 19, 20, 23, 24, 25, 26, 27,
        ];
        let mut records: Vec<_> = weekdays
            .iter()
            .map(|&day| record(day, AttendanceStatus::Present))
            .collect();
        records.push(record(7, AttendanceStatus::Present));
        records.push(record(14, AttendanceStatus::Present));
        records.push(record(1, AttendanceStatus::Present));
        records.push(record(8, AttendanceStatus::Present));
        records.push(record(15, AttendanceStatus::Present));
        records.push(record(30, AttendanceStatus::Leave));
        records
    }

    // ==========================================================================
    // Eligibility
    // ==========================================================================

    #[test]
    fn test_march_scenario_counts_22_days() {
        assert_eq!(count_eligible_days(march(), &march_records()), 22);
    }

    #[test]
    fn test_march_scenario_entitlement_is_1980() {
        let settlement = settle_lunch("B", march(), &march_records(), &[], DEFAULT_LUNCH_PER_DIEM);
        assert_eq!(settlement.eligible_days, 22);
        assert_eq!(settlement.entitlement_amount, dec("1980"));
        assert_eq!(settlement.provenance, Provenance::Computed);
    }

    #[test]
    fn test_late_counts_as_eligible() {
        let records = vec![record(2, AttendanceStatus::Late)];
        assert_eq!(count_eligible_days(march(), &records), 1);
    }

    #[test]
    fn test_sunday_never_counts() {
        let records = vec![
            record(1, AttendanceStatus::Present),
            record(8, AttendanceStatus::Late),
        ];
        assert_eq!(count_eligible_days(march(), &records), 0);
    }

    #[test]
    fn test_same_day_duplicates_are_counted_twice() {
        let records = vec![
            record(2, AttendanceStatus::Present),
            record(2, AttendanceStatus::Present),
        ];
        assert_eq!(count_eligible_days(march(), &records), 2);
    }

    #[test]
    fn test_records_outside_period_are_ignored() {
        let records = vec![AttendanceRecord {
            employee: "B".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            status: AttendanceStatus::Present,
        }];
        assert_eq!(count_eligible_days(march(), &records), 0);
    }

    // ==========================================================================
    // Settlement
    // ==========================================================================

    #[test]
    fn test_difference_is_entitlement_minus_spent() {
        let records = vec![
            record(2, AttendanceStatus::Present),
            record(3, AttendanceStatus::Present),
        ];
        let orders = vec![order(3, 2, "75"), order(3, 3, "120.50")];
        let settlement = settle_lunch("B", march(), &records, &orders, dec("90"));

        assert_eq!(settlement.entitlement_amount, dec("180"));
        assert_eq!(settlement.spent_amount, dec("195.50"));
        assert_eq!(settlement.difference, dec("-15.50"));
    }

    #[test]
    fn test_orders_outside_period_are_ignored() {
        let orders = vec![order(2, 27, "80"), order(3, 31, "60")];
        let settlement = settle_lunch("B", march(), &[], &orders, dec("90"));
        assert_eq!(settlement.spent_amount, dec("60"));
    }

    #[test]
    fn test_configurable_per_diem() {
        let records = vec![record(2, AttendanceStatus::Present)];
        let settlement = settle_lunch("B", march(), &records, &[], dec("100"));
        assert_eq!(settlement.entitlement_amount, dec("100"));
    }
}
