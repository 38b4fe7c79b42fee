//! Canonical schemas for each collection.
//!
//! These are the layouts the collections were created with. The binary
//! provisions its in-memory store from them and tests start from them
//! before introducing drift.

use crate::models::{AttendanceStatus, PayItem};

use super::fields::{
    attendance, cashout_rule, duty, leave, lunch, oplog, overtime_count, overtime_rule, payroll,
    vacation,
};
use super::{CollectionSchema, FieldKind};

/// Attendance collection.
pub fn attendance() -> CollectionSchema {
    let statuses: Vec<&str> = AttendanceStatus::ALL.iter().map(|s| s.label()).collect();
    CollectionSchema::new()
        .with_field(attendance::EMPLOYEE, FieldKind::Title)
        .with_field(attendance::DATE, FieldKind::Date)
        .with_select(attendance::STATUS, &statuses)
}

/// Duty roster collection.
pub fn duty() -> CollectionSchema {
    let schema = CollectionSchema::new()
        .with_field(duty::DAY, FieldKind::Title)
        .with_field(duty::YEAR, FieldKind::Number)
        .with_field(duty::MONTH, FieldKind::Number)
        .with_field(duty::WEEKDAY, FieldKind::Text)
        .with_field(duty::NOTE, FieldKind::Text);
    duty::SHIFT_COLUMNS
        .iter()
        .fold(schema, |schema, column| schema.with_field(column, FieldKind::Text))
}

/// Leave request collection.
pub fn leave() -> CollectionSchema {
    CollectionSchema::new()
        .with_field(leave::EMPLOYEE, FieldKind::Title)
        .with_select(leave::LEAVE_TYPE, &[leave::ANNUAL_LEAVE, "病假", "事假"])
        .with_select(leave::STATUS, &["待審核", "通過", "駁回"])
        .with_field(leave::PERIOD, FieldKind::Date)
        .with_field(leave::HOURS, FieldKind::Number)
}

/// Vacation balance collection.
pub fn vacation() -> CollectionSchema {
    CollectionSchema::new()
        .with_field(vacation::EMPLOYEE, FieldKind::Title)
        .with_field(vacation::YEAR, FieldKind::Number)
        .with_field(vacation::ENTITLED, FieldKind::Number)
        .with_field(vacation::USED, FieldKind::Number)
        .with_field(vacation::REMAINING, FieldKind::Number)
}

/// Cash-out rule collection.
pub fn cashout_rule() -> CollectionSchema {
    CollectionSchema::new()
        .with_field(cashout_rule::NAME, FieldKind::Title)
        .with_field(cashout_rule::YEAR, FieldKind::Number)
        .with_field(cashout_rule::CAP_DAYS, FieldKind::Number)
        .with_field(cashout_rule::HOURS_PER_DAY, FieldKind::Number)
        .with_field(cashout_rule::AMOUNT_PER_HOUR, FieldKind::Number)
}

/// Overtime rule collection.
pub fn overtime_rule() -> CollectionSchema {
    CollectionSchema::new()
        .with_field(overtime_rule::NAME, FieldKind::Title)
        .with_field(overtime_rule::YEAR, FieldKind::Number)
        .with_field(overtime_rule::MONTH, FieldKind::Number)
        .with_field(overtime_rule::SHIFT_HOURS, FieldKind::Number)
        .with_field(overtime_rule::HOURLY_RATE, FieldKind::Number)
        .with_field(overtime_rule::NOTE, FieldKind::Text)
}

/// Overtime count collection.
pub fn overtime_count() -> CollectionSchema {
    CollectionSchema::new()
        .with_field(overtime_count::EMPLOYEE, FieldKind::Title)
        .with_field(overtime_count::YEAR, FieldKind::Number)
        .with_field(overtime_count::MONTH, FieldKind::Number)
        .with_field(overtime_count::HOURS, FieldKind::Number)
}

/// Lunch order collection.
pub fn lunch() -> CollectionSchema {
    CollectionSchema::new()
        .with_field(lunch::EMPLOYEE, FieldKind::Title)
        .with_field(lunch::DATE, FieldKind::Date)
        .with_field(lunch::AMOUNT, FieldKind::Number)
}

/// Payroll collection.
pub fn payroll() -> CollectionSchema {
    let schema = CollectionSchema::new()
        .with_field(payroll::EMPLOYEE, FieldKind::Title)
        .with_field(payroll::YEAR, FieldKind::Number)
        .with_field(payroll::MONTH, FieldKind::Number)
        .with_field(payroll::GROSS_TOTAL, FieldKind::Number)
        .with_field(payroll::DEDUCT_TOTAL, FieldKind::Number)
        .with_field(payroll::NET_PAY, FieldKind::Number)
        .with_field(payroll::NOTE, FieldKind::Text);
    PayItem::ALL
        .iter()
        .fold(schema, |schema, item| schema.with_field(item.label(), FieldKind::Number))
}

/// Operation log collection.
pub fn oplog() -> CollectionSchema {
    CollectionSchema::new()
        .with_field(oplog::EMPLOYEE, FieldKind::Title)
        .with_field(oplog::ACTION, FieldKind::Text)
        .with_field(oplog::CONTENT, FieldKind::Text)
        .with_select(oplog::RESULT, &["成功", "失敗", "系統錯誤"])
        .with_field(oplog::TIME, FieldKind::Date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payroll_schema_has_every_item_and_total() {
        let schema = payroll();
        for item in PayItem::ALL {
            assert!(schema.field(item.label()).is_some(), "missing {}", item.label());
        }
        // 22 items, 3 totals, employee, year, month, note
        assert_eq!(schema.fields.len(), 29);
    }

    #[test]
    fn test_duty_schema_has_shift_columns() {
        let schema = duty();
        for column in duty::SHIFT_COLUMNS {
            assert_eq!(schema.field(column).map(|f| f.kind), Some(FieldKind::Text));
        }
    }

    #[test]
    fn test_attendance_status_options() {
        let schema = attendance();
        let options = &schema.field(attendance::STATUS).unwrap().options;
        assert_eq!(options, &["出席", "請假", "遲到"]);
    }
}
