//! Attendance and lunch order models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Period, Provenance};

/// Daily attendance status as recorded by staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// 出席
    Present,
    /// 請假
    Leave,
    /// 遲到
    Late,
}

impl AttendanceStatus {
    /// Every status in display order.
    pub const ALL: [AttendanceStatus; 3] = [
        AttendanceStatus::Present,
        AttendanceStatus::Leave,
        AttendanceStatus::Late,
    ];

    /// The label stored in the attendance collection.
    pub fn label(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "出席",
            AttendanceStatus::Leave => "請假",
            AttendanceStatus::Late => "遲到",
        }
    }

    /// Parses a stored label.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|status| status.label() == label)
    }

    /// Whether a day with this status earns the meal subsidy.
    pub fn is_lunch_eligible(self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

/// One employee's attendance on one day.
///
/// Several records may exist for the same day; they are never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Employee name.
    pub employee: String,
    /// Attendance date.
    pub date: NaiveDate,
    /// Recorded status.
    pub status: AttendanceStatus,
}

/// A lunch order charged to an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunchOrder {
    /// Employee name.
    pub employee: String,
    /// Order date.
    pub date: NaiveDate,
    /// Order amount.
    pub amount: Decimal,
}

/// Meal subsidy earned against lunch spending for one month.
///
/// `difference` is positive when the subsidy exceeds spending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunchSettlement {
    /// Employee name.
    pub employee: String,
    /// The month settled.
    pub period: Period,
    /// Present or late days on Monday to Saturday.
    pub eligible_days: u32,
    /// `eligible_days` times the per-diem.
    pub entitlement_amount: Decimal,
    /// Sum of lunch orders in the month.
    pub spent_amount: Decimal,
    /// Entitlement minus spending.
    pub difference: Decimal,
    /// Whether the figures are computed or a degraded zero result.
    pub provenance: Provenance,
}

impl LunchSettlement {
    /// A zero settlement that records why it could not be computed.
    pub fn degraded(employee: &str, period: Period, reason: impl Into<String>) -> Self {
        Self {
            employee: employee.to_string(),
            period,
            eligible_days: 0,
            entitlement_amount: Decimal::ZERO,
            spent_amount: Decimal::ZERO,
            difference: Decimal::ZERO,
            provenance: Provenance::Degraded {
                reason: reason.into(),
            },
        }
    }
}
