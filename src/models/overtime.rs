//! Overtime rule, count and pay models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Period, Provenance};

/// Overtime conversion settings for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeRule {
    /// The month the rule applies to.
    pub period: Period,
    /// Hours one shift converts to. Stored for reference; each shift
    /// currently counts as one hour.
    pub shift_hours: Decimal,
    /// Rate paid per overtime hour.
    pub hourly_rate: Decimal,
    /// Free-form note.
    #[serde(default)]
    pub note: String,
}

/// Accrued weekday overtime hours for one employee and month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeCount {
    /// Employee name.
    pub employee: String,
    /// The month counted.
    pub period: Period,
    /// Accrued hours.
    pub hours: Decimal,
}

/// Weekday overtime pay suggested for one employee and month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimePay {
    /// Employee name.
    pub employee: String,
    /// The month.
    pub period: Period,
    /// Accrued hours.
    pub hours: Decimal,
    /// `hours` times the rule's hourly rate.
    pub amount: Decimal,
    /// The rule used, when one exists.
    pub rule: Option<OvertimeRule>,
    /// Whether the figures are computed or a degraded zero result.
    pub provenance: Provenance,
}

impl OvertimePay {
    /// A zero result that records why it could not be computed.
    pub fn degraded(employee: &str, period: Period, reason: impl Into<String>) -> Self {
        Self {
            employee: employee.to_string(),
            period,
            hours: Decimal::ZERO,
            amount: Decimal::ZERO,
            rule: None,
            provenance: Provenance::Degraded {
                reason: reason.into(),
            },
        }
    }
}
