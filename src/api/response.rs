//! Response types for the sick-leave API.
//!
//! This module defines the error response structures, the mapping from
//! [`EngineError`] to HTTP status codes, and the presentation views that add
//! display labels to engine results.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calculation::{
    action_label, days_remaining, expires_soon, illness_type_label, is_expired, status_label,
};
use crate::error::EngineError;
use crate::lifecycle::SickLeaveDetail;
use crate::models::{SickLeaveStatus, TrackingEntry};

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
}

/// API error with HTTP status code.
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
        let message = error.to_string();
        let (status, error) = match error {
            EngineError::Validation { field, .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details("VALIDATION_ERROR", message, format!("field: {}", field)),
            ),
            EngineError::InvalidTransition { from, action, .. } => (
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "INVALID_TRANSITION",
                    message,
                    format!("'{}' is not allowed from status '{}'", action, from),
                ),
            ),
            EngineError::ChainCycle { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("CHAIN_CYCLE", message),
            ),
            EngineError::ChainContinuity { expected_start, .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::with_details(
                    "CHAIN_CONTINUITY",
                    message,
                    format!("start_date must be {}", expected_start),
                ),
            ),
            EngineError::ChainBranch { .. } => {
                (StatusCode::CONFLICT, ApiError::new("CHAIN_BRANCH", message))
            }
            EngineError::RecordNotFound { .. } => {
                (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
            }
            EngineError::ConcurrentModification { .. } => (
                StatusCode::CONFLICT,
                ApiError::with_details("CONFLICT", message, "Reload the record and retry"),
            ),
            EngineError::Storage { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("STORAGE_ERROR", message),
            ),
            EngineError::ScheduleNotFound { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("CONFIG_ERROR", message),
            ),
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
        };
        ApiErrorResponse { status, error }
    }
}

/// A record's full detail with display labels.
#[derive(Debug, Clone, Serialize)]
pub struct SickLeaveDetailView {
    /// The engine's detail.
    #[serde(flatten)]
    pub detail: SickLeaveDetail,
    /// Display label for the illness type.
    pub illness_type_label: &'static str,
    /// Display label for the status.
    pub status_label: &'static str,
    /// Days left until the leave ends.
    pub days_remaining: u32,
    /// True once the leave has ended.
    pub is_expired: bool,
    /// True for an active leave ending within the expiry window.
    pub expires_soon: bool,
}

impl SickLeaveDetailView {
    /// Adds display fields to a detail as of a date.
    pub fn new(detail: SickLeaveDetail, as_of: NaiveDate, window_days: u32) -> Self {
        let record = &detail.record;
        Self {
            illness_type_label: illness_type_label(record.illness_type),
            status_label: status_label(record.status),
            days_remaining: days_remaining(record.end_date, as_of),
            is_expired: is_expired(record.end_date, as_of),
            expires_soon: record.status == SickLeaveStatus::Active
                && expires_soon(record.end_date, as_of, window_days),
            detail,
        }
    }
}

/// A tracking entry with its display label.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingEntryView {
    /// The entry.
    #[serde(flatten)]
    pub entry: TrackingEntry,
    /// Display label for the action.
    pub action_label: &'static str,
}

impl From<TrackingEntry> for TrackingEntryView {
    fn from(entry: TrackingEntry) -> Self {
        Self {
            action_label: action_label(entry.action_type),
            entry,
        }
    }
}
