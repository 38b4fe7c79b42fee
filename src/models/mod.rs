//! Core data models for the entitlement engine.
//!
//! This module contains the domain models read from and written to the
//! collaborator collections, and the results the calculators produce.

mod attendance;
mod duty;
mod leave;
mod outcome;
mod overtime;
mod payroll;
mod period;

pub use attendance::{AttendanceRecord, AttendanceStatus, LunchOrder, LunchSettlement};
pub use duty::{DutyCell, DutyRow, parse_day_label};
pub use leave::{
    CashoutResult, CashoutRule, LeaveRequest, VacationSnapshot, VacationYearRecord, YearEndCashout,
};
pub use outcome::{BatchOutcome, Provenance};
pub use overtime::{OvertimeCount, OvertimePay, OvertimeRule};
pub use payroll::{
    ItemKind, PayItem, PayTotals, PayrollDraft, PayrollInput, PayrollRecord, Suggestion,
};
pub use period::Period;
