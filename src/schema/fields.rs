//! Logical field names per collection.
//!
//! These are the names the business users gave the fields. The actual keys
//! in a live collection may differ slightly; resolve them through a
//! [`FieldMap`](super::FieldMap).

/// Employee name, shared by every per-employee collection.
pub const EMPLOYEE: &str = "員工姓名";

/// Daily attendance records.
pub mod attendance {
    pub use super::EMPLOYEE;
    /// Attendance date.
    pub const DATE: &str = "出勤日期";
    /// Attendance status (出席 / 請假 / 遲到).
    pub const STATUS: &str = "出勤狀態";
}

/// Monthly duty roster rows.
pub mod duty {
    /// Roster year.
    pub const YEAR: &str = "年份";
    /// Roster month.
    pub const MONTH: &str = "月份";
    /// Day of month text, e.g. "1日".
    pub const DAY: &str = "日期";
    /// Weekday label.
    pub const WEEKDAY: &str = "星期";
    /// Free-form note.
    pub const NOTE: &str = "備註";
    /// Inspection line, midday shift.
    pub const INSPECTION_MIDDAY: &str = "檢驗線(中)";
    /// Inspection line, evening shift.
    pub const INSPECTION_EVENING: &str = "檢驗線(晚)";
    /// Cashier, midday shift.
    pub const CASHIER_MIDDAY: &str = "收費員(中)";
    /// Cashier, evening shift.
    pub const CASHIER_EVENING: &str = "收費員(晚)";
    /// Cleaning duty.
    pub const CLEANING: &str = "打掃工作";

    /// Columns that hold people rather than row metadata.
    pub const SHIFT_COLUMNS: [&str; 5] = [
        INSPECTION_MIDDAY,
        INSPECTION_EVENING,
        CASHIER_MIDDAY,
        CASHIER_EVENING,
        CLEANING,
    ];

    /// Columns that never contain employee names.
    pub const NON_PERSON_COLUMNS: [&str; 3] = [DAY, WEEKDAY, NOTE];
}

/// Leave requests.
pub mod leave {
    pub use super::EMPLOYEE;
    /// Leave type; annual leave is [`ANNUAL_LEAVE`].
    pub const LEAVE_TYPE: &str = "假別";
    /// Approval status.
    pub const STATUS: &str = "狀態";
    /// Leave period (date range).
    pub const PERIOD: &str = "請假期間";
    /// Requested hours.
    pub const HOURS: &str = "請假時數";
    /// Leave type value for annual leave.
    pub const ANNUAL_LEAVE: &str = "特休";
    /// Approved-status synonyms, tried in order against the field's options.
    pub const APPROVED_STATUSES: [&str; 6] = ["通過", "已通過", "核准", "已核准", "同意", "Approved"];
}

/// Per-employee-per-year vacation balances.
pub mod vacation {
    pub use super::EMPLOYEE;
    /// Balance year.
    pub const YEAR: &str = "年度";
    /// Hours granted for the year.
    pub const ENTITLED: &str = "本年度特休時數";
    /// Stored copy of used hours.
    pub const USED: &str = "已使用特休時數";
    /// Stored copy of remaining hours.
    pub const REMAINING: &str = "剩餘特休時數";
}

/// Per-year cash-out rules.
pub mod cashout_rule {
    /// Title holding the year.
    pub const NAME: &str = "名稱";
    /// Rule year.
    pub const YEAR: &str = "年份";
    /// Maximum days that may be cashed out.
    pub const CAP_DAYS: &str = "可折算天數";
    /// Hours in one leave day.
    pub const HOURS_PER_DAY: &str = "一天時數";
    /// Cash value of one hour.
    pub const AMOUNT_PER_HOUR: &str = "一小時折算金額";
}

/// Per-month overtime rules.
pub mod overtime_rule {
    /// Title holding "YYYY-MM".
    pub const NAME: &str = "名稱";
    /// Rule year.
    pub const YEAR: &str = "年份";
    /// Rule month.
    pub const MONTH: &str = "月份";
    /// Hours one shift converts to.
    pub const SHIFT_HOURS: &str = "班次換算時數";
    /// Overtime hourly rate.
    pub const HOURLY_RATE: &str = "加班時薪";
    /// Free-form note.
    pub const NOTE: &str = "備註";
}

/// Per-employee-per-month overtime counts.
pub mod overtime_count {
    pub use super::EMPLOYEE;
    /// Count year.
    pub const YEAR: &str = "年份";
    /// Count month.
    pub const MONTH: &str = "月份";
    /// Accrued hours.
    pub const HOURS: &str = "時數";
}

/// Lunch orders.
pub mod lunch {
    pub use super::EMPLOYEE;
    /// Order date.
    pub const DATE: &str = "訂餐日期";
    /// Order amount.
    pub const AMOUNT: &str = "訂餐金額";
}

/// Monthly payroll records.
pub mod payroll {
    pub use super::EMPLOYEE;
    /// Payroll year.
    pub const YEAR: &str = "薪資年份";
    /// Payroll month.
    pub const MONTH: &str = "薪資月份";
    /// Sum of additions.
    pub const GROSS_TOTAL: &str = "薪資總計";
    /// Sum of deductions.
    pub const DEDUCT_TOTAL: &str = "應扣總計";
    /// Gross minus deductions.
    pub const NET_PAY: &str = "實發金額";
    /// Free-form note.
    pub const NOTE: &str = "備註";
}

/// Operation log entries.
pub mod oplog {
    pub use super::EMPLOYEE;
    /// Action type.
    pub const ACTION: &str = "操作類型";
    /// Action details.
    pub const CONTENT: &str = "操作內容";
    /// Outcome.
    pub const RESULT: &str = "操作結果";
    /// When the action happened.
    pub const TIME: &str = "操作時間";
}
