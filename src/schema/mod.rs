//! Collection schemas, field kinds and the Field Resolver.
//!
//! A [`CollectionSchema`] is a snapshot of one collection's fields as the
//! store reports them. Business logic never indexes records with literal
//! keys; it resolves logical names (see [`fields`]) against a schema into a
//! [`FieldMap`] and reads and writes through that.
//!
//! # Example
//!
//! ```
//! use entitlement_engine::schema::{CollectionSchema, FieldKind, FieldMap, fields};
//!
//! let schema = CollectionSchema::new()
//!     .with_field("員工姓名", FieldKind::Title)
//!     .with_field("訂餐金額 ", FieldKind::Number);
//! let map = FieldMap::build("lunch", &schema, &[fields::lunch::EMPLOYEE, fields::lunch::AMOUNT]);
//!
//! assert_eq!(map.key(fields::lunch::AMOUNT), Some("訂餐金額 "));
//! ```

pub mod canonical;
pub mod fields;
mod kind;
mod resolver;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use kind::{
    DateSpan, FieldKind, FieldValue, Scalar, encode_checkbox, encode_date, encode_multi_select,
    encode_number, encode_select, encode_text, encode_title,
};
pub use resolver::{
    FieldMap, ResolvedField, normalize_field_name, resolve, resolve_prefix, title_field,
};

/// Definition of a single field in a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// The field's kind.
    pub kind: FieldKind,
    /// Allowed options for select and multi-select fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// The fields of one collection, keyed by their actual names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionSchema {
    /// Field definitions by actual key.
    pub fields: BTreeMap<String, FieldSchema>,
}

impl CollectionSchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field without options.
    pub fn with_field(mut self, name: &str, kind: FieldKind) -> Self {
        self.fields.insert(
            name.to_string(),
            FieldSchema {
                kind,
                options: Vec::new(),
            },
        );
        self
    }

    /// Adds a select field with the given options.
    pub fn with_select(mut self, name: &str, options: &[&str]) -> Self {
        self.fields.insert(
            name.to_string(),
            FieldSchema {
                kind: FieldKind::Select,
                options: options.iter().map(|option| option.to_string()).collect(),
            },
        );
        self
    }

    /// Adds a multi-select field with the given options.
    pub fn with_multi_select(mut self, name: &str, options: &[&str]) -> Self {
        self.fields.insert(
            name.to_string(),
            FieldSchema {
                kind: FieldKind::MultiSelect,
                options: options.iter().map(|option| option.to_string()).collect(),
            },
        );
        self
    }

    /// Looks up a field by its actual key.
    pub fn field(&self, key: &str) -> Option<&FieldSchema> {
        self.fields.get(key)
    }

    /// Removes a field by its actual key.
    pub fn without_field(mut self, key: &str) -> Self {
        self.fields.remove(key);
        self
    }
}
