//! Error types for the sick-leave engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition that can abort a lifecycle, chain or report operation.
//! Non-blocking conditions (amount mismatches, unvalued records) are not
//! errors and travel alongside successful results instead.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::SickLeaveStatus;

/// The main error type for the sick-leave engine.
///
/// All operations in the engine return this error type. Validation and
/// transition errors are always raised before any write is attempted.
///
/// # Example
///
/// ```
/// use sick_leave_engine::error::EngineError;
///
/// let error = EngineError::Validation {
///     field: "end_date".to_string(),
///     message: "must not be before start_date".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Invalid field 'end_date': must not be before start_date"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// An input field was missing or malformed.
    #[error("Invalid field '{field}': {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// What made the field invalid.
        message: String,
    },

    /// The requested status change is not allowed from the current status.
    #[error("Cannot {action} sick leave {record_id} while it is {from}")]
    InvalidTransition {
        /// The record the transition was attempted on.
        record_id: Uuid,
        /// The status the record was in.
        from: SickLeaveStatus,
        /// The attempted action.
        action: String,
    },

    /// Walking the extension chain revisited a record before reaching a root.
    #[error("Extension chain of {record_id} loops back to {repeated_id}")]
    ChainCycle {
        /// The record whose chain was being resolved.
        record_id: Uuid,
        /// The id that was seen twice.
        repeated_id: Uuid,
    },

    /// An extension does not start the day after its predecessor ends.
    #[error(
        "Extension of {previous_id} must start on {expected_start}, got {actual_start}"
    )]
    ChainContinuity {
        /// The predecessor record.
        previous_id: Uuid,
        /// The only acceptable start date.
        expected_start: NaiveDate,
        /// The start date that was supplied.
        actual_start: NaiveDate,
    },

    /// The predecessor already has a direct successor.
    #[error("Sick leave {previous_id} already has extension {existing_successor}")]
    ChainBranch {
        /// The predecessor record.
        previous_id: Uuid,
        /// The successor that already links to it.
        existing_successor: Uuid,
    },

    /// No record exists with the given id.
    #[error("Sick leave not found: {id}")]
    RecordNotFound {
        /// The id that was looked up.
        id: Uuid,
    },

    /// The stored record changed between the read and the write of a transition.
    #[error("Sick leave {record_id} was modified concurrently")]
    ConcurrentModification {
        /// The record that changed underneath the transition.
        record_id: Uuid,
    },

    /// The persistence collaborator failed.
    #[error("Storage error: {message}")]
    Storage {
        /// The failure reported by the storage layer.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed or failed validation.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No band schedule is in effect on the given date.
    #[error("No band schedule in effect on {date}")]
    ScheduleNotFound {
        /// The date for which a schedule was requested.
        date: NaiveDate,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::Validation`] error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
