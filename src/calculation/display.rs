//! Display labels and date-relative flags.
//!
//! Pure mapping functions applied when records are presented. Nothing here
//! is stored.

use chrono::NaiveDate;

use crate::models::{IllnessType, SickLeaveStatus, TrackingAction};

/// Human-readable label for an illness type.
pub fn illness_type_label(illness_type: IllnessType) -> &'static str {
    match illness_type {
        IllnessType::GeneralIllness => "General illness",
        IllnessType::WorkAccident => "Work accident",
        IllnessType::OccupationalDisease => "Occupational disease",
        IllnessType::MaternityLeave => "Maternity leave",
        IllnessType::PaternityLeave => "Paternity leave",
    }
}

/// Human-readable label for a status.
pub fn status_label(status: SickLeaveStatus) -> &'static str {
    match status {
        SickLeaveStatus::Active => "Active",
        SickLeaveStatus::Transcribed => "Transcribed",
        SickLeaveStatus::Collected => "Collected",
        SickLeaveStatus::Cancelled => "Cancelled",
    }
}

/// Human-readable label for a tracking action.
pub fn action_label(action: TrackingAction) -> &'static str {
    match action {
        TrackingAction::Created => "Created",
        TrackingAction::Transcribed => "Transcribed",
        TrackingAction::Collected => "Collected",
        TrackingAction::Cancelled => "Cancelled",
        TrackingAction::ExtensionCreated => "Extension created",
        TrackingAction::Note => "Note",
        TrackingAction::DocumentAttached => "Document attached",
    }
}

/// Days from `as_of` until `end_date`, never negative.
///
/// # Examples
///
/// ```
/// use sick_leave_engine::calculation::days_remaining;
/// use chrono::NaiveDate;
///
/// let end = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
/// assert_eq!(days_remaining(end, NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()), 3);
/// assert_eq!(days_remaining(end, NaiveDate::from_ymd_opt(2024, 1, 12).unwrap()), 0);
/// ```
pub fn days_remaining(end_date: NaiveDate, as_of: NaiveDate) -> u32 {
    u32::try_from((end_date - as_of).num_days().max(0)).unwrap_or(u32::MAX)
}

/// True once `as_of` is past the last day of leave.
pub fn is_expired(end_date: NaiveDate, as_of: NaiveDate) -> bool {
    as_of > end_date
}

/// True if the leave has not ended and ends within `window_days` of `as_of`.
pub fn expires_soon(end_date: NaiveDate, as_of: NaiveDate, window_days: u32) -> bool {
    !is_expired(end_date, as_of) && days_remaining(end_date, as_of) <= window_days
}
