//! Payroll totals and suggestion merging.

use rust_decimal::Decimal;

use crate::models::{ItemKind, PayItem, PayTotals, PayrollInput};

/// Computes the totals to store for a payroll save.
///
/// Gross and deduction totals are the sums of the addition and deduction
/// items unless the input supplies them. Net pay is gross minus deductions
/// (using whichever totals were chosen) unless supplied.
///
/// # Example
///
/// ```
/// use entitlement_engine::calculation::compute_totals;
/// use entitlement_engine::models::{PayItem, PayrollInput};
/// use rust_decimal::Decimal;
///
/// let mut input = PayrollInput::default();
/// input.items.insert(PayItem::FullSalary, Decimal::from(30000));
/// input.items.insert(PayItem::LaborInsurance, Decimal::from(700));
///
/// let totals = compute_totals(&input);
/// assert_eq!(totals.gross_total, Decimal::from(30000));
/// assert_eq!(totals.deduct_total, Decimal::from(700));
/// assert_eq!(totals.net_pay, Decimal::from(29300));
/// ```
pub fn compute_totals(input: &PayrollInput) -> PayTotals {
    let sum = |kind: ItemKind| -> Decimal {
        PayItem::ALL
            .iter()
            .filter(|item| item.kind() == kind)
            .map(|item| input.amount(*item))
            .sum()
    };

    let gross_total = input.gross_total.unwrap_or_else(|| sum(ItemKind::Addition));
    let deduct_total = input.deduct_total.unwrap_or_else(|| sum(ItemKind::Deduction));
    let net_pay = input.net_pay.unwrap_or(gross_total - deduct_total);

    PayTotals {
        gross_total,
        deduct_total,
        net_pay,
    }
}

/// Chooses between a stored value and a suggestion.
///
/// A stored value always wins; the suggestion only fills an empty field.
///
/// # Example
///
/// ```
/// use entitlement_engine::calculation::merge;
///
/// assert_eq!(merge(Some(500), 200), 500);
/// assert_eq!(merge(None, 200), 200);
/// ```
pub fn merge<V>(stored: Option<V>, suggested: V) -> V {
    stored.unwrap_or(suggested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn input(items: &[(PayItem, &str)]) -> PayrollInput {
        PayrollInput {
            items: items.iter().map(|(item, v)| (*item, dec(v))).collect(),
            ..PayrollInput::default()
        }
    }

    // ==========================================================================
    // Totals
    // ==========================================================================

    #[test]
    fn test_totals_sum_by_kind() {
        let input = input(&[
            (PayItem::FullSalary, "30000"),
            (PayItem::MealAllowance, "1980"),
            (PayItem::WeekdayOvertimePay, "400.50"),
            (PayItem::LaborInsurance, "700"),
            (PayItem::HealthInsurance, "450"),
        ]);
        let totals = compute_totals(&input);
        assert_eq!(totals.gross_total, dec("32380.50"));
        assert_eq!(totals.deduct_total, dec("1150"));
        assert_eq!(totals.net_pay, dec("31230.50"));
    }

    #[test]
    fn test_supplied_gross_drives_net() {
        let mut input = input(&[(PayItem::FullSalary, "30000"), (PayItem::OtherDeduction, "100")]);
        input.gross_total = Some(dec("31000"));
        let totals = compute_totals(&input);
        assert_eq!(totals.gross_total, dec("31000"));
        assert_eq!(totals.net_pay, dec("30900"));
    }

    #[test]
    fn test_supplied_net_is_kept() {
        let mut input = input(&[(PayItem::FullSalary, "30000")]);
        input.net_pay = Some(dec("29999"));
        assert_eq!(compute_totals(&input).net_pay, dec("29999"));
    }

    #[test]
    fn test_empty_input_totals_zero() {
        assert_eq!(compute_totals(&PayrollInput::default()), PayTotals::default());
    }

    // ==========================================================================
    // Merge
    // ==========================================================================

    #[test]
    fn test_stored_value_wins_over_suggestion() {
        assert_eq!(merge(Some(dec("500")), dec("200")), dec("500"));
    }

    #[test]
    fn test_stored_zero_is_still_a_value() {
        assert_eq!(merge(Some(Decimal::ZERO), dec("200")), Decimal::ZERO);
    }

    #[test]
    fn test_absent_value_takes_suggestion() {
        assert_eq!(merge(None, dec("200")), dec("200"));
    }
}
