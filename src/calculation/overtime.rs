//! Weekday overtime accrual from the duty roster.
//!
//! Each occupancy of a shift column by an employee on a Monday to Friday
//! date accrues one overtime unit. An employee named in two columns on the
//! same day accrues two; nothing is de-duplicated. Saturday and Sunday rows
//! accrue nothing.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::{DutyCell, DutyRow, Period};
use crate::schema::{fields, normalize_field_name};

use super::day_detection::is_overtime_weekday;

/// Characters that separate names within one roster cell, besides
/// whitespace.
pub const NAME_SEPARATORS: [char; 10] = [',', '，', '、', '/', '／', '·', '・', '‧', ';', '；'];

/// Splits a roster cell into the names it contains.
///
/// Names are separated by commas (half- and full-width), the ideographic
/// comma, slashes, middle dots, semicolons or any whitespace, including
/// newlines and the ideographic space. Empty pieces are dropped.
///
/// # Example
///
/// ```
/// use entitlement_engine::calculation::split_names;
///
/// assert_eq!(split_names("王小明、李大華 陳美玲"), vec!["王小明", "李大華", "陳美玲"]);
/// assert!(split_names("  ").is_empty());
/// ```
pub fn split_names(cell: &str) -> Vec<String> {
    cell.split(|c: char| c.is_whitespace() || NAME_SEPARATORS.contains(&c))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn cell_names(cell: &DutyCell) -> Vec<String> {
    match cell {
        DutyCell::Text(text) => split_names(text),
        DutyCell::Names(names) => names.iter().flat_map(|name| split_names(name)).collect(),
    }
}

fn is_person_column(column: &str) -> bool {
    let column = normalize_field_name(column);
    !fields::duty::NON_PERSON_COLUMNS
        .iter()
        .any(|meta| normalize_field_name(meta) == column)
}

/// Counts weekday roster appearances per employee for one month.
///
/// # Arguments
///
/// * `period` - The month the rows belong to
/// * `rows` - The month's roster rows
///
/// # Returns
///
/// A map from employee name to the number of (date, column) occupancies on
/// Monday to Friday. Rows without a day, with a day outside the month, or
/// dated Saturday or Sunday are skipped.
///
/// # Example
///
/// ```
/// use entitlement_engine::calculation::compute_weekday_appearances;
/// use entitlement_engine::models::{DutyRow, Period};
///
/// // 2026-02-02 is a Monday
/// let rows = vec![
///     DutyRow::new(Some(2))
///         .with_cell("檢驗線(中)", "A")
///         .with_cell("收費員(晚)", "A"),
/// ];
/// let counts = compute_weekday_appearances(Period::new(2026, 2).unwrap(), &rows);
/// assert_eq!(counts["A"], 2);
/// ```
pub fn compute_weekday_appearances(period: Period, rows: &[DutyRow]) -> BTreeMap<String, u32> {
    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    for row in rows {
        let Some(date) = row.day.filter(|day| *day > 0).and_then(|day| period.day(day)) else {
            continue;
        };
        if !is_overtime_weekday(date) {
            continue;
        }
        for (column, cell) in &row.columns {
            if !is_person_column(column) {
                continue;
            }
            for name in cell_names(cell) {
                *counts.entry(name).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Overtime pay for accrued hours at a rate.
///
/// Returns zero when the rate is not positive.
pub fn overtime_amount(hours: Decimal, hourly_rate: Decimal) -> Decimal {
    if hourly_rate <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    hours * hourly_rate
}
