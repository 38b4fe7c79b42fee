//! Field kinds, stored values and their conversions.
//!
//! The store describes every field with one of a closed set of kinds. Values
//! travel in and out of the store as [`FieldValue`]s; business logic works
//! with [`Scalar`]s and converts through exactly one encode function and one
//! decode arm per kind.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The kind of a field in a collection schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// The record's display title. At most one per collection.
    Title,
    /// Free text.
    Text,
    /// One value from a closed option list.
    Select,
    /// Any number of values from a closed option list.
    MultiSelect,
    /// A decimal number.
    Number,
    /// A boolean flag.
    Checkbox,
    /// A date or date range.
    Date,
}

/// A date with an optional inclusive end, as stored in date fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    /// The first day.
    pub start: NaiveDate,
    /// The last day, when the field holds a range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

impl DateSpan {
    /// A single-day span.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: None,
        }
    }
}

/// A value as held by the store, tagged with the kind of its field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Title text.
    Title(String),
    /// Free text.
    Text(String),
    /// Selected option, if any.
    Select(Option<String>),
    /// Selected options.
    MultiSelect(Vec<String>),
    /// A number; `None` when the field is cleared.
    Number(Option<Decimal>),
    /// A flag.
    Checkbox(bool),
    /// A date; `None` when the field is cleared.
    Date(Option<DateSpan>),
}

impl FieldValue {
    /// The kind of field this value belongs to.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Title(_) => FieldKind::Title,
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Select(_) => FieldKind::Select,
            FieldValue::MultiSelect(_) => FieldKind::MultiSelect,
            FieldValue::Number(_) => FieldKind::Number,
            FieldValue::Checkbox(_) => FieldKind::Checkbox,
            FieldValue::Date(_) => FieldKind::Date,
        }
    }

    /// Decodes the stored value into a scalar.
    ///
    /// Empty text, cleared numbers, cleared dates and unselected options all
    /// decode to [`Scalar::Empty`].
    pub fn decode(&self) -> Scalar {
        match self {
            FieldValue::Title(text) | FieldValue::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    Scalar::Empty
                } else {
                    Scalar::Text(text.to_string())
                }
            }
            FieldValue::Select(option) => match option.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => Scalar::Text(name.to_string()),
                _ => Scalar::Empty,
            },
            FieldValue::MultiSelect(options) => Scalar::List(options.clone()),
            FieldValue::Number(number) => number.map_or(Scalar::Empty, Scalar::Number),
            FieldValue::Checkbox(flag) => Scalar::Flag(*flag),
            FieldValue::Date(span) => span.map_or(Scalar::Empty, Scalar::Date),
        }
    }
}

/// A kind-independent value used by business logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scalar {
    /// No value.
    Empty,
    /// Text.
    Text(String),
    /// A decimal number.
    Number(Decimal),
    /// A date or date range.
    Date(DateSpan),
    /// A flag.
    Flag(bool),
    /// A list of names.
    List(Vec<String>),
}

impl Scalar {
    /// The value rendered as text, if it has one.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Scalar::Empty => None,
            Scalar::Text(text) => Some(text.clone()),
            Scalar::Number(number) => Some(number.normalize().to_string()),
            Scalar::Date(span) => Some(span.start.format("%Y-%m-%d").to_string()),
            Scalar::Flag(flag) => Some(flag.to_string()),
            Scalar::List(items) if items.is_empty() => None,
            Scalar::List(items) => Some(items.join(", ")),
        }
    }

    /// The value as a number. Text is parsed; anything else is `None`.
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Scalar::Number(number) => Some(*number),
            Scalar::Text(text) => Decimal::from_str(text.trim()).ok(),
            _ => None,
        }
    }

    /// The value as a date span. Text beginning with `YYYY-MM-DD` is parsed.
    pub fn as_date(&self) -> Option<DateSpan> {
        match self {
            Scalar::Date(span) => Some(*span),
            Scalar::Text(text) => text
                .get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
                .map(DateSpan::day),
            _ => None,
        }
    }

    /// True when both values denote the same thing.
    ///
    /// Numbers compare numerically, dates by start day, everything else by
    /// trimmed text.
    pub fn matches(&self, other: &Scalar) -> bool {
        match (self, other) {
            (Scalar::Empty, Scalar::Empty) => true,
            (Scalar::Number(a), b) | (b, Scalar::Number(a)) => b.as_number() == Some(*a),
            (Scalar::Date(a), b) | (b, Scalar::Date(a)) => {
                b.as_date().map(|span| span.start) == Some(a.start)
            }
            (a, b) => match (a.as_text(), b.as_text()) {
                (Some(a), Some(b)) => a.trim() == b.trim(),
                _ => false,
            },
        }
    }

    /// Orders two values for sorting; empty values sort last.
    pub fn compare(&self, other: &Scalar) -> Ordering {
        match (self, other) {
            (Scalar::Empty, Scalar::Empty) => Ordering::Equal,
            (Scalar::Empty, _) => Ordering::Greater,
            (_, Scalar::Empty) => Ordering::Less,
            (Scalar::Number(a), Scalar::Number(b)) => a.cmp(b),
            (Scalar::Date(a), Scalar::Date(b)) => a.start.cmp(&b.start),
            (a, b) => a.as_text().cmp(&b.as_text()),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<Decimal> for Scalar {
    fn from(value: Decimal) -> Self {
        Scalar::Number(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Number(Decimal::from(value))
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Scalar::Number(Decimal::from(value))
    }
}

impl From<NaiveDate> for Scalar {
    fn from(value: NaiveDate) -> Self {
        Scalar::Date(DateSpan::day(value))
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Flag(value)
    }
}

/// Encodes a title value.
pub fn encode_title(text: &str) -> FieldValue {
    FieldValue::Title(text.to_string())
}

/// Encodes a text value.
pub fn encode_text(text: &str) -> FieldValue {
    FieldValue::Text(text.to_string())
}

/// Encodes a select value.
///
/// Returns `None` when the schema declares options and `name` is not one of
/// them; an empty option list accepts any name.
pub fn encode_select(name: &str, options: &[String]) -> Option<FieldValue> {
    let name = name.trim();
    if name.is_empty() {
        return Some(FieldValue::Select(None));
    }
    if !options.is_empty() && !options.iter().any(|option| option == name) {
        return None;
    }
    Some(FieldValue::Select(Some(name.to_string())))
}

/// Encodes a multi-select value, dropping names outside the option list.
pub fn encode_multi_select(names: &[String], options: &[String]) -> FieldValue {
    let selected = names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .filter(|name| options.is_empty() || options.iter().any(|option| option == name))
        .map(str::to_string)
        .collect();
    FieldValue::MultiSelect(selected)
}

/// Encodes a number value.
pub fn encode_number(number: Option<Decimal>) -> FieldValue {
    FieldValue::Number(number)
}

/// Encodes a checkbox value.
pub fn encode_checkbox(flag: bool) -> FieldValue {
    FieldValue::Checkbox(flag)
}

/// Encodes a date value.
pub fn encode_date(span: Option<DateSpan>) -> FieldValue {
    FieldValue::Date(span)
}

impl FieldKind {
    /// Encodes `value` for a field of this kind.
    ///
    /// Returns `None` when the value cannot be represented, for example text
    /// that does not parse as a number or a select name outside `options`.
    pub fn encode(self, value: &Scalar, options: &[String]) -> Option<FieldValue> {
        match self {
            FieldKind::Title => Some(encode_title(&value.as_text().unwrap_or_default())),
            FieldKind::Text => Some(encode_text(&value.as_text().unwrap_or_default())),
            FieldKind::Select => encode_select(&value.as_text().unwrap_or_default(), options),
            FieldKind::MultiSelect => {
                let names = match value {
                    Scalar::List(names) => names.clone(),
                    Scalar::Empty => Vec::new(),
                    other => other.as_text().into_iter().collect(),
                };
                Some(encode_multi_select(&names, options))
            }
            FieldKind::Number => match value {
                Scalar::Empty => Some(encode_number(None)),
                other => other.as_number().map(|number| encode_number(Some(number))),
            },
            FieldKind::Checkbox => match value {
                Scalar::Flag(flag) => Some(encode_checkbox(*flag)),
                Scalar::Empty => Some(encode_checkbox(false)),
                _ => None,
            },
            FieldKind::Date => match value {
                Scalar::Empty => Some(encode_date(None)),
                other => other.as_date().map(|span| encode_date(Some(span))),
            },
        }
    }
}
