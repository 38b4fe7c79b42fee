//! Calculation logic for the entitlement engine.
//!
//! This module contains the pure calculations: day detection, meal subsidy
//! settlement, weekday overtime accrual from the duty roster, vacation
//! balance and cash-out arithmetic, and payroll totals with suggestion
//! merging. Nothing here touches the document store; the services feed
//! these functions with records they have read.

mod cashout;
mod day_detection;
mod lunch;
mod overtime;
mod payroll;

pub use cashout::{DEFAULT_HOURS_PER_DAY, calculate_cashout, remaining_hours};
pub use day_detection::{DayType, get_day_type, is_lunch_workday, is_overtime_weekday};
pub use lunch::{DEFAULT_LUNCH_PER_DIEM, count_eligible_days, settle_lunch};
pub use overtime::{NAME_SEPARATORS, compute_weekday_appearances, overtime_amount, split_names};
pub use payroll::{compute_totals, merge};
