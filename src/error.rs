//! Error types for the entitlement engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure a public operation can report to its caller.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::store::StoreError;

/// The main error type for the entitlement engine.
///
/// Calculators that are allowed to degrade (lunch settlement, overtime pay
/// suggestion) never return this type; they return a zero result flagged
/// as degraded instead. Everything else reports failures through it.
///
/// # Example
///
/// ```
/// use entitlement_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A collaborator collection required by the operation has no id configured.
    #[error("Collection '{collection}' is not configured")]
    ConfigurationMissing {
        /// The logical collection name.
        collection: String,
    },

    /// A field required by the operation cannot be resolved in the collection schema.
    #[error("Field '{field}' cannot be resolved in collection '{collection}'")]
    SchemaMismatch {
        /// The collection whose schema was searched.
        collection: String,
        /// The logical field name that was not found.
        field: String,
    },

    /// A required caller-supplied value was empty.
    #[error("Missing required value: {field}")]
    MissingField {
        /// The field that was empty.
        field: String,
    },

    /// The year/month pair does not identify a calendar month.
    #[error("Invalid period {year}-{month}")]
    InvalidPeriod {
        /// The requested year.
        year: i32,
        /// The requested month.
        month: u32,
    },

    /// Requested annual leave exceeds the remaining balance.
    #[error("Insufficient annual leave: remaining {remaining} hours, requested {requested} hours")]
    InsufficientLeave {
        /// Hours still available for the year.
        remaining: Decimal,
        /// Hours the caller asked for.
        requested: Decimal,
    },

    /// A rule update carried values that violate the rule's constraints.
    #[error("Invalid rule: {message}")]
    InvalidRule {
        /// A description of the violated constraint.
        message: String,
    },

    /// The external document store failed or rejected the call.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Returns true for failures a calculator may degrade on instead of
    /// surfacing (missing configuration and store transport failures).
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            EngineError::ConfigurationMissing { .. } | EngineError::Store(_)
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
