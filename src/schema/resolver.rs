//! Field Resolver.
//!
//! Collections are maintained by hand, so the actual key of a field can drift
//! from its logical name by whitespace, parenthesis width or letter case.
//! Resolution tries the exact key first, then the normalized form, and only
//! the payroll aggregator falls back to a prefix match.

use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};
use crate::store::{Filter, Properties, Record};

use super::kind::{FieldKind, FieldValue, Scalar};
use super::CollectionSchema;

/// Normalizes a field name for comparison.
///
/// Full-width parentheses become half-width, every whitespace character
/// (including the ideographic space and the no-break space) is removed and
/// the result is lower-cased.
///
/// # Example
///
/// ```
/// use entitlement_engine::schema::normalize_field_name;
///
/// assert_eq!(normalize_field_name("檢驗線（中） "), "檢驗線(中)");
/// assert_eq!(normalize_field_name("Year\u{3000}Total"), "yeartotal");
/// ```
pub fn normalize_field_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '（' => '(',
            '）' => ')',
            other => other,
        })
        .flat_map(char::to_lowercase)
        .collect()
}

/// Resolves a logical field name to the actual key in `schema`.
///
/// Tries an exact match, then a normalized match. Returns `None` when
/// neither finds a field.
pub fn resolve<'a>(schema: &'a CollectionSchema, logical: &str) -> Option<&'a str> {
    if let Some((key, _)) = schema.fields.get_key_value(logical) {
        return Some(key.as_str());
    }
    let wanted = normalize_field_name(logical);
    schema
        .fields
        .keys()
        .find(|key| normalize_field_name(key) == wanted)
        .map(String::as_str)
}

/// Like [`resolve`], with a last-resort match on any key whose normalized
/// form starts with the normalized logical name.
pub fn resolve_prefix<'a>(schema: &'a CollectionSchema, logical: &str) -> Option<&'a str> {
    if let Some(key) = resolve(schema, logical) {
        return Some(key);
    }
    let wanted = normalize_field_name(logical);
    if wanted.is_empty() {
        return None;
    }
    schema
        .fields
        .keys()
        .find(|key| normalize_field_name(key).starts_with(&wanted))
        .map(String::as_str)
}

/// Returns the key of the first title field in `schema`.
pub fn title_field(schema: &CollectionSchema) -> Option<&str> {
    schema
        .fields
        .iter()
        .find(|(_, field)| field.kind == FieldKind::Title)
        .map(|(key, _)| key.as_str())
}

/// A logical field resolved against a schema snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    /// The actual key in the collection.
    pub key: String,
    /// The field's kind.
    pub kind: FieldKind,
    /// Allowed options for select kinds.
    pub options: Vec<String>,
}

/// Lookup table from logical names to resolved fields for one collection.
///
/// Built once per collection access; all reads and writes of record
/// properties go through it.
#[derive(Debug, Clone)]
pub struct FieldMap {
    collection: String,
    fields: HashMap<&'static str, ResolvedField>,
}

impl FieldMap {
    /// Resolves every name in `logical` with exact then normalized matching.
    /// Names that cannot be resolved are left out.
    pub fn build(collection: &str, schema: &CollectionSchema, logical: &[&'static str]) -> Self {
        Self::build_with(collection, schema, logical, resolve)
    }

    /// Like [`FieldMap::build`], with prefix matching as a last resort.
    pub fn build_with_prefix(
        collection: &str,
        schema: &CollectionSchema,
        logical: &[&'static str],
    ) -> Self {
        Self::build_with(collection, schema, logical, resolve_prefix)
    }

    fn build_with(
        collection: &str,
        schema: &CollectionSchema,
        logical: &[&'static str],
        resolver: for<'s> fn(&'s CollectionSchema, &str) -> Option<&'s str>,
    ) -> Self {
        let fields = logical
            .iter()
            .filter_map(|name| {
                let key = resolver(schema, name)?;
                let field = schema.fields.get(key)?;
                Some((
                    *name,
                    ResolvedField {
                        key: key.to_string(),
                        kind: field.kind,
                        options: field.options.clone(),
                    },
                ))
            })
            .collect();
        Self {
            collection: collection.to_string(),
            fields,
        }
    }

    /// Maps `logical` to the collection's title field when it did not
    /// resolve by name.
    pub fn with_title_fallback(mut self, schema: &CollectionSchema, logical: &'static str) -> Self {
        if !self.fields.contains_key(logical) {
            if let Some(key) = title_field(schema) {
                self.fields.insert(
                    logical,
                    ResolvedField {
                        key: key.to_string(),
                        kind: FieldKind::Title,
                        options: Vec::new(),
                    },
                );
            }
        }
        self
    }

    /// The collection this map was built for.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// The resolved field for `logical`, if any.
    pub fn get(&self, logical: &str) -> Option<&ResolvedField> {
        self.fields.get(logical)
    }

    /// The actual key for `logical`, if any.
    pub fn key(&self, logical: &str) -> Option<&str> {
        self.get(logical).map(|field| field.key.as_str())
    }

    /// True when `logical` resolved.
    pub fn contains(&self, logical: &str) -> bool {
        self.fields.contains_key(logical)
    }

    /// The resolved field for `logical`, or a schema mismatch error.
    pub fn require(&self, logical: &str) -> EngineResult<&ResolvedField> {
        self.get(logical).ok_or_else(|| EngineError::SchemaMismatch {
            collection: self.collection.clone(),
            field: logical.to_string(),
        })
    }

    /// Encodes `value` for `logical`, returning the key and stored value.
    pub fn encode(&self, logical: &str, value: impl Into<Scalar>) -> Option<(String, FieldValue)> {
        let field = self.get(logical)?;
        let encoded = field.kind.encode(&value.into(), &field.options)?;
        Some((field.key.clone(), encoded))
    }

    /// Encodes `value` for `logical` into `properties`.
    ///
    /// Returns false, leaving `properties` untouched, when the field did not
    /// resolve or the value could not be encoded for its kind.
    pub fn put(&self, properties: &mut Properties, logical: &str, value: impl Into<Scalar>) -> bool {
        match self.encode(logical, value) {
            Some((key, encoded)) => {
                properties.insert(key, encoded);
                true
            }
            None => false,
        }
    }

    /// Encodes a lookup-key value for `logical` into `properties`.
    ///
    /// Fails with `SchemaMismatch`, leaving `properties` untouched, when the
    /// field did not resolve or the stored value would not match an equality
    /// lookup on `value` (a select without that option, say). A record
    /// written without its key can never be found by that key again.
    pub fn put_key(
        &self,
        properties: &mut Properties,
        logical: &str,
        value: impl Into<Scalar>,
    ) -> EngineResult<()> {
        let value = value.into();
        let field = self.require(logical)?;
        let encoded = field
            .kind
            .encode(&value, &field.options)
            .filter(|encoded| encoded.decode().matches(&value))
            .ok_or_else(|| EngineError::SchemaMismatch {
                collection: self.collection.clone(),
                field: logical.to_string(),
            })?;
        properties.insert(field.key.clone(), encoded);
        Ok(())
    }

    /// Filter selecting records whose `logical` field names `value`.
    ///
    /// Multi-select fields match when `value` is one of the selected
    /// options; every other kind matches on equality.
    pub fn naming(&self, logical: &str, value: &str) -> EngineResult<Filter> {
        let field = self.require(logical)?;
        let value = value.trim();
        Ok(match field.kind {
            FieldKind::MultiSelect => Filter::Contains {
                field: field.key.clone(),
                value: value.to_string(),
            },
            _ => Filter::equals(&field.key, value),
        })
    }

    /// Reads `logical` from `record`; unresolved or absent fields read as empty.
    pub fn read(&self, record: &Record, logical: &str) -> Scalar {
        self.key(logical)
            .and_then(|key| record.properties.get(key))
            .map_or(Scalar::Empty, FieldValue::decode)
    }
}
