//! Request types for the entitlement engine API.
//!
//! Payroll saves take a [`PayrollInput`](crate::models::PayrollInput)
//! directly; the other write endpoints use the bodies defined here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{CashoutRule, DutyRow, OvertimeRule, Period};

/// Body of `POST /overtime-sync/{year}/{month}`.
///
/// When the body is empty the rows are read from the duty collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OvertimeSyncRequest {
    /// Roster rows of the month.
    #[serde(default)]
    pub rows: Vec<DutyRow>,
}

/// Body of `PUT /overtime-rules/{year}/{month}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OvertimeRuleRequest {
    /// Hours one shift converts to.
    #[serde(default)]
    pub shift_hours: Decimal,
    /// Overtime hourly rate.
    pub hourly_rate: Decimal,
    /// Free-form note.
    #[serde(default)]
    pub note: String,
}

impl OvertimeRuleRequest {
    /// The rule this request describes for `period`.
    pub fn into_rule(self, period: Period) -> OvertimeRule {
        OvertimeRule {
            period,
            shift_hours: self.shift_hours,
            hourly_rate: self.hourly_rate,
            note: self.note,
        }
    }
}

/// Body of `POST /vacation/{employee}/{year}/validate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveCheckRequest {
    /// Hours of annual leave about to be requested.
    pub requested_hours: Decimal,
}

/// Body of `POST /cashout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashoutRequest {
    /// Unused vacation hours.
    pub remaining_hours: Decimal,
    /// Hours in one leave day.
    #[serde(default = "default_hours_per_day")]
    pub hours_per_day: Decimal,
    /// Maximum days paid out.
    pub cap_days: Decimal,
    /// Cash value of one day.
    pub amount_per_day: Decimal,
    /// Drop partial days instead of rounding to two places.
    #[serde(default = "default_whole_days_only")]
    pub whole_days_only: bool,
}

fn default_hours_per_day() -> Decimal {
    Decimal::from(8)
}

fn default_whole_days_only() -> bool {
    true
}

/// One employee's entitlement in a bulk update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitlementRequest {
    /// Employee name.
    pub employee: String,
    /// Hours granted for the year.
    pub hours: Decimal,
}

/// Body of `PUT /vacation-entitlements/{year}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitlementsRequest {
    /// The entitlements to set.
    pub entitlements: Vec<EntitlementRequest>,
}

impl EntitlementsRequest {
    /// The (employee, hours) pairs of this request.
    pub fn pairs(&self) -> Vec<(String, Decimal)> {
        self.entitlements
            .iter()
            .map(|entry| (entry.employee.clone(), entry.hours))
            .collect()
    }
}

/// Body of `PUT /cashout-rules/{year}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashoutRuleRequest {
    /// Maximum days that may be cashed out.
    pub cap_days: Decimal,
    /// Hours in one leave day.
    pub hours_per_day: Decimal,
    /// Cash value of one hour.
    pub amount_per_hour: Decimal,
}

impl CashoutRuleRequest {
    /// The rule this request describes for `year`.
    pub fn into_rule(self, year: i32) -> CashoutRule {
        CashoutRule {
            year,
            cap_days: self.cap_days,
            hours_per_day: self.hours_per_day,
            amount_per_hour: self.amount_per_hour,
        }
    }
}
