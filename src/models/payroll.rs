//! Payroll models.
//!
//! A payroll record holds 14 addition items and 8 deduction items, each
//! stored in its own field, plus three totals. Items that were never
//! written, or were cleared, are absent rather than zero so that a
//! suggestion can tell "no value yet" from "deliberately zero".

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::store::RecordId;

use super::{Period, Provenance};

/// Whether a pay item adds to or deducts from pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Counts towards the gross total.
    Addition,
    /// Counts towards the deduction total.
    Deduction,
}

/// A payroll line item.
///
/// # Example
///
/// ```
/// use entitlement_engine::models::{ItemKind, PayItem};
///
/// assert_eq!(PayItem::MealAllowance.label(), "伙食津貼");
/// assert_eq!(PayItem::LaborInsurance.kind(), ItemKind::Deduction);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayItem {
    /// 全薪
    FullSalary,
    /// 負責人職務津貼
    ManagerDutyAllowance,
    /// 職務津貼
    DutyAllowance,
    /// 績效獎金
    PerformanceBonus,
    /// 交通津貼
    TransportAllowance,
    /// 營業津貼
    BusinessAllowance,
    /// 配合
    Cooperation,
    /// 全勤獎金
    PerfectAttendanceBonus,
    /// 證照加給
    CertificationAllowance,
    /// 伙食津貼
    MealAllowance,
    /// 平日(中晚)加班費
    WeekdayOvertimePay,
    /// 週六加班費
    SaturdayOvertimePay,
    /// 交際費
    EntertainmentExpense,
    /// 年終補助
    YearEndSubsidy,
    /// 借支
    SalaryAdvance,
    /// 病假請假
    SickLeave,
    /// 事假請假
    PersonalLeave,
    /// 借款利息
    LoanInterest,
    /// 遲到/早退
    LateOrEarlyLeave,
    /// 勞保費
    LaborInsurance,
    /// 健保費
    HealthInsurance,
    /// 其他
    OtherDeduction,
}

impl PayItem {
    /// Every item, additions first, in payslip order.
    pub const ALL: [PayItem; 22] = [
        PayItem::FullSalary,
        PayItem::ManagerDutyAllowance,
        PayItem::DutyAllowance,
        PayItem::PerformanceBonus,
        PayItem::TransportAllowance,
        PayItem::BusinessAllowance,
        PayItem::Cooperation,
        PayItem::PerfectAttendanceBonus,
        PayItem::CertificationAllowance,
        PayItem::MealAllowance,
        PayItem::WeekdayOvertimePay,
        PayItem::SaturdayOvertimePay,
        PayItem::EntertainmentExpense,
        PayItem::YearEndSubsidy,
        PayItem::SalaryAdvance,
        PayItem::SickLeave,
        PayItem::PersonalLeave,
        PayItem::LoanInterest,
        PayItem::LateOrEarlyLeave,
        PayItem::LaborInsurance,
        PayItem::HealthInsurance,
        PayItem::OtherDeduction,
    ];

    /// The field name in the payroll collection.
    pub fn label(self) -> &'static str {
        match self {
            PayItem::FullSalary => "全薪",
            PayItem::ManagerDutyAllowance => "負責人職務津貼",
            PayItem::DutyAllowance => "職務津貼",
            PayItem::PerformanceBonus => "績效獎金",
            PayItem::TransportAllowance => "交通津貼",
            PayItem::BusinessAllowance => "營業津貼",
            PayItem::Cooperation => "配合",
            PayItem::PerfectAttendanceBonus => "全勤獎金",
            PayItem::CertificationAllowance => "證照加給",
            PayItem::MealAllowance => "伙食津貼",
            PayItem::WeekdayOvertimePay => "平日(中晚)加班費",
            PayItem::SaturdayOvertimePay => "週六加班費",
            PayItem::EntertainmentExpense => "交際費",
            PayItem::YearEndSubsidy => "年終補助",
            PayItem::SalaryAdvance => "借支",
            PayItem::SickLeave => "病假請假",
            PayItem::PersonalLeave => "事假請假",
            PayItem::LoanInterest => "借款利息",
            PayItem::LateOrEarlyLeave => "遲到/早退",
            PayItem::LaborInsurance => "勞保費",
            PayItem::HealthInsurance => "健保費",
            PayItem::OtherDeduction => "其他",
        }
    }

    /// Whether the item is an addition or a deduction.
    pub fn kind(self) -> ItemKind {
        match self {
            PayItem::SalaryAdvance
            | PayItem::SickLeave
            | PayItem::PersonalLeave
            | PayItem::LoanInterest
            | PayItem::LateOrEarlyLeave
            | PayItem::LaborInsurance
            | PayItem::HealthInsurance
            | PayItem::OtherDeduction => ItemKind::Deduction,
            _ => ItemKind::Addition,
        }
    }

    /// Field names of every item, for building a field map.
    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|item| item.label()).collect()
    }
}

/// Aggregated totals for a payroll record.
///
/// # Example
///
/// ```
/// use entitlement_engine::models::PayTotals;
/// use rust_decimal::Decimal;
///
/// let totals = PayTotals {
///     gross_total: Decimal::from(32000),
///     deduct_total: Decimal::from(1500),
///     net_pay: Decimal::from(30500),
/// };
/// assert_eq!(totals.gross_total - totals.deduct_total, totals.net_pay);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PayTotals {
    /// Sum of additions (薪資總計).
    pub gross_total: Decimal,
    /// Sum of deductions (應扣總計).
    pub deduct_total: Decimal,
    /// Gross minus deductions (實發金額).
    pub net_pay: Decimal,
}

/// A payroll record as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// Store id of the record.
    pub id: RecordId,
    /// Employee name.
    pub employee: String,
    /// The month paid.
    pub period: Period,
    /// Items holding a value. Unwritten and cleared items are absent.
    pub items: BTreeMap<PayItem, Decimal>,
    /// Stored 薪資總計.
    pub gross_total: Option<Decimal>,
    /// Stored 應扣總計.
    pub deduct_total: Option<Decimal>,
    /// Stored 實發金額.
    pub net_pay: Option<Decimal>,
    /// Free-form note.
    #[serde(default)]
    pub note: String,
}

impl PayrollRecord {
    /// The stored value of `item`, if any.
    pub fn item(&self, item: PayItem) -> Option<Decimal> {
        self.items.get(&item).copied()
    }
}

/// Values submitted for saving a payroll record.
///
/// Totals left as `None` are computed from the items.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PayrollInput {
    /// Item amounts. Items not listed are saved as zero.
    #[serde(default)]
    pub items: BTreeMap<PayItem, Decimal>,
    /// Explicit 薪資總計.
    #[serde(default)]
    pub gross_total: Option<Decimal>,
    /// Explicit 應扣總計.
    #[serde(default)]
    pub deduct_total: Option<Decimal>,
    /// Explicit 實發金額.
    #[serde(default)]
    pub net_pay: Option<Decimal>,
    /// Free-form note.
    #[serde(default)]
    pub note: String,
}

impl PayrollInput {
    /// The amount for `item`, zero when not listed.
    pub fn amount(&self, item: PayItem) -> Decimal {
        self.items.get(&item).copied().unwrap_or(Decimal::ZERO)
    }
}

/// A suggested value for one pay item and whether it was used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// The item suggested for.
    pub item: PayItem,
    /// The computed value.
    pub suggested: Decimal,
    /// The value already stored, if any.
    pub stored: Option<Decimal>,
    /// True when the draft carries `suggested`; false when it kept `stored`.
    pub applied: bool,
    /// Whether `suggested` was computed or a degraded zero.
    pub provenance: Provenance,
}

/// A payroll form pre-filled from the stored record and suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollDraft {
    /// Employee name.
    pub employee: String,
    /// The month.
    pub period: Period,
    /// Id of the existing record, if there is one.
    pub record_id: Option<RecordId>,
    /// Every item with its draft value.
    pub items: BTreeMap<PayItem, Decimal>,
    /// Totals of the draft values.
    pub totals: PayTotals,
    /// Stored note.
    pub note: String,
    /// Suggestions considered for the draft.
    pub suggestions: Vec<Suggestion>,
}

impl PayrollDraft {
    /// Converts the draft into a save request with totals recomputed on save.
    pub fn into_input(self) -> PayrollInput {
        PayrollInput {
            items: self.items,
            gross_total: None,
            deduct_total: None,
            net_pay: None,
            note: self.note,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourteen_additions_and_eight_deductions() {
        let additions = PayItem::ALL
            .iter()
            .filter(|item| item.kind() == ItemKind::Addition)
            .count();
        let deductions = PayItem::ALL
            .iter()
            .filter(|item| item.kind() == ItemKind::Deduction)
            .count();
        assert_eq!(additions, 14);
        assert_eq!(deductions, 8);
    }

    #[test]
    fn test_labels_are_unique() {
        let mut labels = PayItem::labels();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), 22);
    }

    #[test]
    fn test_items_serialize_as_snake_case_keys() {
        let mut input = PayrollInput::default();
        input.items.insert(PayItem::WeekdayOvertimePay, Decimal::from(200));
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["items"]["weekday_overtime_pay"], "200");

        let back: PayrollInput = serde_json::from_value(json).unwrap();
        assert_eq!(back.amount(PayItem::WeekdayOvertimePay), Decimal::from(200));
    }

    #[test]
    fn test_missing_item_amount_is_zero() {
        let input = PayrollInput::default();
        assert_eq!(input.amount(PayItem::FullSalary), Decimal::ZERO);
    }
}
