//! Tracking (audit) log entries for sick-leave records.
//!
//! Entries are append-only: the engine stamps `action_date` itself and no
//! operation ever edits or removes an entry once it is written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of action recorded in the tracking log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingAction {
    /// The record was registered.
    Created,
    /// The record was filed with the paying entity.
    Transcribed,
    /// Reimbursement was received.
    Collected,
    /// The record was voided.
    Cancelled,
    /// The record was registered as an extension of another one.
    ExtensionCreated,
    /// Free-text administrative note.
    Note,
    /// A document reference was attached.
    DocumentAttached,
}

/// One immutable row of a record's tracking log.
///
/// # Example
///
/// ```
/// use sick_leave_engine::models::{TrackingAction, TrackingEntry};
///
/// let json = r#"{
///     "id": "7c0f5f55-8f7e-4a62-9d55-1d7a2c4f9a10",
///     "sick_leave_id": "0b6b7b0e-2f4a-4d69-9f55-0c4c6d9e8a21",
///     "action_date": "2024-01-02T09:30:00Z",
///     "action_type": "created",
///     "description": "Registered INC-2024-0001",
///     "performed_by": "hr_admin"
/// }"#;
///
/// let entry: TrackingEntry = serde_json::from_str(json).unwrap();
/// assert_eq!(entry.action_type, TrackingAction::Created);
/// assert!(entry.additional_data.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingEntry {
    /// Unique identifier.
    pub id: Uuid,
    /// The record this entry belongs to.
    pub sick_leave_id: Uuid,
    /// When the action happened. Always stamped by the engine.
    pub action_date: DateTime<Utc>,
    /// What happened.
    pub action_type: TrackingAction,
    /// Human-readable description.
    pub description: String,
    /// The actor responsible.
    pub performed_by: String,
    /// Structured context (figures, reasons, previous values).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_data: Option<serde_json::Value>,
}

impl TrackingEntry {
    pub(crate) fn new(
        sick_leave_id: Uuid,
        action_type: TrackingAction,
        description: impl Into<String>,
        performed_by: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sick_leave_id,
            action_date: Utc::now(),
            action_type,
            description: description.into(),
            performed_by: performed_by.to_string(),
            additional_data: None,
        }
    }

    pub(crate) fn with_data(mut self, data: serde_json::Value) -> Self {
        self.additional_data = Some(data);
        self
    }
}
