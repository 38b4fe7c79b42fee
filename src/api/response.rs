//! Response types for the entitlement engine API.
//!
//! This module defines the error response structures, the mapping from
//! [`EngineError`] to HTTP statuses, and the small bodies returned by
//! endpoints that have no model of their own.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{BatchOutcome, VacationSnapshot};
use crate::store::StoreError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates a missing field error response.
    pub fn missing_field(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::with_details(
            "MISSING_FIELD",
            format!("missing field: {}", field),
            format!("Required value '{}' was empty", field),
        )
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates a response from a status and body.
    pub fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }

    /// 404 for a record that does not exist.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
    }

    /// 400 for a request body that could not be read.
    pub fn from_rejection(rejection: JsonRejection) -> Self {
        let error = match rejection {
            JsonRejection::JsonDataError(err) => {
                let body_text = err.body_text();
                if body_text.contains("missing field") {
                    ApiError::validation_error(body_text)
                } else {
                    ApiError::malformed_json(body_text)
                }
            }
            JsonRejection::JsonSyntaxError(err) => {
                ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
            }
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
            }
            _ => ApiError::malformed_json("Failed to parse request body"),
        };
        Self::new(StatusCode::BAD_REQUEST, error)
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { path } => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            ),
            EngineError::ConfigParseError { path, message } => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            ),
            EngineError::ConfigurationMissing { collection } => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIGURATION_MISSING",
                    message,
                    format!("Set collections.{} in engine.yaml", collection),
                ),
            ),
            EngineError::SchemaMismatch { collection, field } => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "SCHEMA_MISMATCH",
                    message,
                    format!("Collection '{}' has no field matching '{}'", collection, field),
                ),
            ),
            EngineError::MissingField { field } => {
                Self::new(StatusCode::BAD_REQUEST, ApiError::missing_field(field))
            }
            EngineError::InvalidPeriod { .. } => {
                Self::new(StatusCode::BAD_REQUEST, ApiError::new("INVALID_PERIOD", message))
            }
            EngineError::InsufficientLeave { .. } => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("INSUFFICIENT_LEAVE", message),
            ),
            EngineError::InvalidRule { .. } => {
                Self::new(StatusCode::BAD_REQUEST, ApiError::validation_error(message))
            }
            EngineError::Store(store) => {
                let (status, code) = match store {
                    StoreError::Unavailable { .. } => {
                        (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE")
                    }
                    StoreError::Rejected { .. } => (StatusCode::BAD_GATEWAY, "STORE_REJECTED"),
                    StoreError::RecordNotFound { .. } => (StatusCode::NOT_FOUND, "RECORD_NOT_FOUND"),
                };
                Self::new(status, ApiError::new(code, message))
            }
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok".
    pub status: String,
}

/// Body of `POST /vacation/{employee}/{year}/validate`.
///
/// An insufficient balance is an answer, not an error, so this endpoint
/// reports it with `ok: false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveCheckResponse {
    /// Whether the request fits the remaining balance.
    pub ok: bool,
    /// Human-readable outcome.
    pub message: String,
    /// The balance the check was made against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<VacationSnapshot>,
}

/// Body returned by batch endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    /// Number of keys written.
    pub succeeded_count: usize,
    /// Number of keys that failed.
    pub failed_count: usize,
    /// Per-key outcome.
    pub outcome: BatchOutcome<String>,
}

impl From<BatchOutcome<String>> for BatchResponse {
    fn from(outcome: BatchOutcome<String>) -> Self {
        let (succeeded_count, failed_count) = outcome.counts();
        Self {
            succeeded_count,
            failed_count,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details")); // Should be skipped when None
    }

    #[test]
    fn test_missing_field_maps_to_bad_request() {
        let response: ApiErrorResponse = EngineError::MissingField {
            field: "員工姓名".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "MISSING_FIELD");
        assert!(response.error.message.contains("員工姓名"));
    }

    #[test]
    fn test_insufficient_leave_maps_to_unprocessable() {
        let response: ApiErrorResponse = EngineError::InsufficientLeave {
            remaining: Decimal::from(10),
            requested: Decimal::from(12),
        }
        .into();
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.error.message.contains("remaining 10"));
    }

    #[test]
    fn test_store_errors_map_by_kind() {
        let unavailable: ApiErrorResponse = EngineError::Store(StoreError::Unavailable {
            collection: "payroll".to_string(),
        })
        .into();
        assert_eq!(unavailable.status, StatusCode::SERVICE_UNAVAILABLE);

        let rejected: ApiErrorResponse = EngineError::Store(StoreError::Rejected {
            message: "bad".to_string(),
        })
        .into();
        assert_eq!(rejected.status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_schema_mismatch_is_server_error() {
        let response: ApiErrorResponse = EngineError::SchemaMismatch {
            collection: "payroll".to_string(),
            field: "薪資月份".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.error.code, "SCHEMA_MISMATCH");
    }

    #[test]
    fn test_batch_response_counts() {
        let mut outcome = BatchOutcome::new();
        outcome.succeed("A".to_string());
        outcome.fail("B".to_string(), "store down");
        let response = BatchResponse::from(outcome);
        assert_eq!(response.succeeded_count, 1);
        assert_eq!(response.failed_count, 1);
    }
}
