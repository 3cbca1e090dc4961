//! Response types for the payroll withholding API.
//!
//! Successful calculations are returned as [`CalculationResult`] bodies.
//! Errors use `{error, details}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::CalculationResult;
use crate::withholding::BatchOutcome;

/// API error response structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable error message.
    pub error: String,
    /// Optional details about the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates an error without details.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    /// Creates an error with details.
    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }

    /// Creates an invalid-request error.
    pub fn invalid_request(details: impl Into<String>) -> Self {
        Self::with_details("Invalid request", details)
    }

    /// Creates a malformed JSON error.
    pub fn malformed_json(details: impl Into<String>) -> Self {
        Self::with_details("Malformed JSON", details)
    }

    /// Creates an internal server error.
    pub fn internal(details: impl Into<String>) -> Self {
        Self::with_details("Internal server error", details)
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

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::TaxProfileNotFound { .. } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new("Employee tax profile not found"),
            },
            EngineError::EmployeeNotFound { .. } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new("Employee not found"),
            },
            err @ (EngineError::UnknownPayFrequency { .. }
            | EngineError::InvalidPayEvent { .. }) => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::invalid_request(err.to_string()),
            },
            err @ (EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::StoreError { .. }
            | EngineError::CalculationError { .. }) => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::internal(err.to_string()),
            },
        }
    }
}

/// Outcome status of one batch entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchEntryStatus {
    /// The calculation succeeded.
    Ok,
    /// The calculation failed.
    Error,
}

/// One entry of a batch response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntryResponse {
    /// The worker the entry was for.
    pub employee_id: String,
    /// Whether the entry succeeded.
    pub status: BatchEntryStatus,
    /// The result, on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<CalculationResult>,
    /// The error, on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl BatchEntryResponse {
    /// Creates a failed entry.
    pub fn failed(employee_id: impl Into<String>, error: ApiError) -> Self {
        Self {
            employee_id: employee_id.into(),
            status: BatchEntryStatus::Error,
            result: None,
            error: Some(error),
        }
    }
}

impl From<BatchOutcome> for BatchEntryResponse {
    fn from(outcome: BatchOutcome) -> Self {
        match outcome.result {
            Ok(result) => Self {
                employee_id: outcome.employee_id,
                status: BatchEntryStatus::Ok,
                result: Some(result),
                error: None,
            },
            Err(err) => Self::failed(outcome.employee_id, ApiErrorResponse::from(err).error),
        }
    }
}

/// Response body for `POST /calculate-tax-withholdings/batch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCalculationResponse {
    /// One entry per request, in request order.
    pub results: Vec<BatchEntryResponse>,
}
