//! Duty roster rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The content of one roster cell: either free text naming one or more
/// people, or an explicit list of names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DutyCell {
    /// Explicit list of names.
    Names(Vec<String>),
    /// Free text, possibly several names joined by separators.
    Text(String),
}

impl From<&str> for DutyCell {
    fn from(value: &str) -> Self {
        DutyCell::Text(value.to_string())
    }
}

/// One day of the monthly duty roster.
///
/// `columns` maps column names (shift labels, plus metadata such as 星期 or
/// 備註) to their cells. The day of month is `None` when the row's date text
/// could not be read.
///
/// # Example
///
/// ```
/// use entitlement_engine::models::DutyRow;
///
/// let row = DutyRow::new(Some(2))
///     .with_cell("檢驗線(中)", "A")
///     .with_cell("收費員(晚)", "A、B");
/// assert_eq!(row.columns.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DutyRow {
    /// Day of month.
    pub day: Option<u32>,
    /// Cells by column name.
    #[serde(default)]
    pub columns: BTreeMap<String, DutyCell>,
}

impl DutyRow {
    /// An empty row for `day`.
    pub fn new(day: Option<u32>) -> Self {
        Self {
            day,
            columns: BTreeMap::new(),
        }
    }

    /// Adds a cell.
    pub fn with_cell(mut self, column: &str, cell: impl Into<DutyCell>) -> Self {
        self.columns.insert(column.to_string(), cell.into());
        self
    }
}

/// Reads the day of month from roster date text such as "1日" or " 12 ".
///
/// Only the ASCII digits are kept; text without digits yields `None`.
pub fn parse_day_label(text: &str) -> Option<u32> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}
