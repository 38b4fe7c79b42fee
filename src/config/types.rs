//! Configuration types for the entitlement engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from `engine.yaml`. Every section has defaults, so an
//! empty file (or no file at all) yields a usable configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The collections the engine reads and writes.
///
/// Each variant names one collaborator collection; its id comes from
/// [`CollectionIds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Daily attendance status.
    Attendance,
    /// Monthly duty roster.
    Duty,
    /// Leave requests.
    Leave,
    /// Per-employee-per-year vacation balances.
    Vacation,
    /// Per-year cash-out rules.
    CashoutRule,
    /// Per-month overtime rules.
    OvertimeRule,
    /// Per-employee-per-month overtime counts.
    OvertimeCount,
    /// Lunch orders.
    Lunch,
    /// Monthly payroll records.
    Payroll,
    /// Operation log.
    Oplog,
}

impl Collection {
    /// The logical name used in configuration and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Collection::Attendance => "attendance",
            Collection::Duty => "duty",
            Collection::Leave => "leave",
            Collection::Vacation => "vacation",
            Collection::CashoutRule => "cashout_rule",
            Collection::OvertimeRule => "overtime_rule",
            Collection::OvertimeCount => "overtime_count",
            Collection::Lunch => "lunch",
            Collection::Payroll => "payroll",
            Collection::Oplog => "oplog",
        }
    }
}

/// Store ids of the collaborator collections.
///
/// A collection whose id is absent is not configured; operations that need
/// it fail with `ConfigurationMissing` or degrade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionIds {
    /// Attendance collection id.
    #[serde(default)]
    pub attendance: Option<String>,
    /// Duty roster collection id.
    #[serde(default)]
    pub duty: Option<String>,
    /// Leave request collection id.
    #[serde(default)]
    pub leave: Option<String>,
    /// Vacation balance collection id.
    #[serde(default)]
    pub vacation: Option<String>,
    /// Cash-out rule collection id.
    #[serde(default)]
    pub cashout_rule: Option<String>,
    /// Overtime rule collection id.
    #[serde(default)]
    pub overtime_rule: Option<String>,
    /// Overtime count collection id.
    #[serde(default)]
    pub overtime_count: Option<String>,
    /// Lunch order collection id.
    #[serde(default)]
    pub lunch: Option<String>,
    /// Payroll collection id.
    #[serde(default)]
    pub payroll: Option<String>,
    /// Operation log collection id.
    #[serde(default)]
    pub oplog: Option<String>,
}

impl Default for CollectionIds {
    /// Every collection configured under its logical name.
    fn default() -> Self {
        let id = |c: Collection| Some(c.name().to_string());
        Self {
            attendance: id(Collection::Attendance),
            duty: id(Collection::Duty),
            leave: id(Collection::Leave),
            vacation: id(Collection::Vacation),
            cashout_rule: id(Collection::CashoutRule),
            overtime_rule: id(Collection::OvertimeRule),
            overtime_count: id(Collection::OvertimeCount),
            lunch: id(Collection::Lunch),
            payroll: id(Collection::Payroll),
            oplog: id(Collection::Oplog),
        }
    }
}

impl CollectionIds {
    /// The id configured for `collection`, if any. Blank ids count as absent.
    pub fn get(&self, collection: Collection) -> Option<&str> {
        let id = match collection {
            Collection::Attendance => &self.attendance,
            Collection::Duty => &self.duty,
            Collection::Leave => &self.leave,
            Collection::Vacation => &self.vacation,
            Collection::CashoutRule => &self.cashout_rule,
            Collection::OvertimeRule => &self.overtime_rule,
            Collection::OvertimeCount => &self.overtime_count,
            Collection::Lunch => &self.lunch,
            Collection::Payroll => &self.payroll,
            Collection::Oplog => &self.oplog,
        };
        id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    /// The id configured for `collection`, or `ConfigurationMissing`.
    pub fn require(&self, collection: Collection) -> EngineResult<&str> {
        self.get(collection)
            .ok_or_else(|| EngineError::ConfigurationMissing {
                collection: collection.name().to_string(),
            })
    }
}

/// Meal subsidy settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LunchConfig {
    /// Subsidy per eligible day.
    #[serde(default = "default_per_diem")]
    pub per_diem: Decimal,
}

impl Default for LunchConfig {
    fn default() -> Self {
        Self {
            per_diem: default_per_diem(),
        }
    }
}

fn default_per_diem() -> Decimal {
    Decimal::from(90)
}

/// Cash-out values used when a year has no rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashoutDefaults {
    /// Hours in one leave day.
    #[serde(default = "default_hours_per_day")]
    pub hours_per_day: Decimal,
    /// Maximum days that may be cashed out.
    #[serde(default = "default_cap_days")]
    pub cap_days: Decimal,
    /// Cash value of one day.
    #[serde(default = "default_amount_per_day")]
    pub amount_per_day: Decimal,
    /// Whether partial days are dropped.
    #[serde(default = "default_whole_days_only")]
    pub whole_days_only: bool,
}

impl Default for CashoutDefaults {
    fn default() -> Self {
        Self {
            hours_per_day: default_hours_per_day(),
            cap_days: default_cap_days(),
            amount_per_day: default_amount_per_day(),
            whole_days_only: default_whole_days_only(),
        }
    }
}

fn default_hours_per_day() -> Decimal {
    Decimal::from(8)
}

fn default_cap_days() -> Decimal {
    Decimal::from(5)
}

fn default_amount_per_day() -> Decimal {
    Decimal::from(1000)
}

fn default_whole_days_only() -> bool {
    true
}

/// Read cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry lifetime in seconds; zero disables caching.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    60
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

/// The complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Collection ids.
    #[serde(default)]
    pub collections: CollectionIds,
    /// Meal subsidy settings.
    #[serde(default)]
    pub lunch: LunchConfig,
    /// Cash-out fallbacks.
    #[serde(default)]
    pub cashout: CashoutDefaults,
    /// Read cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
}
