//! Sick-leave status transition table.
//!
//! ```text
//! Active ──transcribe──▶ Transcribed ──collect──▶ Collected
//!    │                        │
//!    └────────cancel──────────┴──────▶ Cancelled
//! ```
//!
//! `Collected` and `Cancelled` have no outgoing transitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::SickLeaveStatus;

/// An action that changes a record's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    /// File the record with the paying entity.
    Transcribe,
    /// Register the reimbursement.
    Collect,
    /// Void the record.
    Cancel,
}

impl LifecycleAction {
    /// All actions, in lifecycle order.
    pub const ALL: [LifecycleAction; 3] = [
        LifecycleAction::Transcribe,
        LifecycleAction::Collect,
        LifecycleAction::Cancel,
    ];

    /// Lowercase verb used in messages.
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleAction::Transcribe => "transcribe",
            LifecycleAction::Collect => "collect",
            LifecycleAction::Cancel => "cancel",
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The status an action leads to from `from`, or `None` if it is not allowed.
///
/// # Examples
///
/// ```
/// use sick_leave_engine::lifecycle::{LifecycleAction, next_status};
/// use sick_leave_engine::models::SickLeaveStatus;
///
/// assert_eq!(
///     next_status(SickLeaveStatus::Active, LifecycleAction::Transcribe),
///     Some(SickLeaveStatus::Transcribed)
/// );
/// assert_eq!(next_status(SickLeaveStatus::Active, LifecycleAction::Collect), None);
/// ```
pub fn next_status(from: SickLeaveStatus, action: LifecycleAction) -> Option<SickLeaveStatus> {
    use LifecycleAction::*;
    use SickLeaveStatus::*;

    match (from, action) {
        (Active, Transcribe) => Some(Transcribed),
        (Transcribed, Collect) => Some(Collected),
        (Active | Transcribed, Cancel) => Some(Cancelled),
        _ => None,
    }
}

/// Applies an action to a record's status.
///
/// # Errors
///
/// Returns `InvalidTransition` if the table has no edge for `(from, action)`.
pub fn apply_transition(
    record_id: Uuid,
    from: SickLeaveStatus,
    action: LifecycleAction,
) -> EngineResult<SickLeaveStatus> {
    next_status(from, action).ok_or_else(|| EngineError::InvalidTransition {
        record_id,
        from,
        action: action.as_str().to_string(),
    })
}

/// Actions allowed from a status.
pub fn allowed_actions(from: SickLeaveStatus) -> Vec<LifecycleAction> {
    LifecycleAction::ALL
        .into_iter()
        .filter(|action| next_status(from, *action).is_some())
        .collect()
}
