//! Sick-leave record model and related types.
//!
//! This module defines the [`SickLeaveRecord`] struct, the [`IllnessType`] and
//! [`SickLeaveStatus`] enums, and the input shapes used to create records and
//! extensions.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The medical or legal cause behind a sick-leave certificate.
///
/// The cause decides who pays and at which percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IllnessType {
    /// Common illness, paid by the employer first and then by the EPS.
    GeneralIllness,
    /// Accident at work, paid in full by the ARL.
    WorkAccident,
    /// Illness caused by the job, paid in full by the ARL.
    OccupationalDisease,
    /// Maternity leave, paid in full by the EPS.
    MaternityLeave,
    /// Paternity leave, paid in full by the EPS.
    PaternityLeave,
}

impl IllnessType {
    /// Returns true for causes covered by the occupational-risk insurer.
    ///
    /// # Examples
    ///
    /// ```
    /// use sick_leave_engine::models::IllnessType;
    ///
    /// assert!(IllnessType::WorkAccident.is_work_related());
    /// assert!(!IllnessType::GeneralIllness.is_work_related());
    /// ```
    pub fn is_work_related(self) -> bool {
        matches!(
            self,
            IllnessType::WorkAccident | IllnessType::OccupationalDisease
        )
    }

    /// Returns true for maternity and paternity leave.
    pub fn is_parental_leave(self) -> bool {
        matches!(
            self,
            IllnessType::MaternityLeave | IllnessType::PaternityLeave
        )
    }
}

/// Lifecycle status of a sick-leave record.
///
/// `Collected` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SickLeaveStatus {
    /// Registered, not yet filed with the paying entity.
    Active,
    /// Filed with the paying entity, awaiting reimbursement.
    Transcribed,
    /// Reimbursement received.
    Collected,
    /// Voided. Records are never deleted.
    Cancelled,
}

impl SickLeaveStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [SickLeaveStatus; 4] = [
        SickLeaveStatus::Active,
        SickLeaveStatus::Transcribed,
        SickLeaveStatus::Collected,
        SickLeaveStatus::Cancelled,
    ];

    /// Returns true if no transition may leave this status.
    pub fn is_terminal(self) -> bool {
        matches!(self, SickLeaveStatus::Collected | SickLeaveStatus::Cancelled)
    }

    /// The snake_case name used on the wire and in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            SickLeaveStatus::Active => "active",
            SickLeaveStatus::Transcribed => "transcribed",
            SickLeaveStatus::Collected => "collected",
            SickLeaveStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SickLeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A certified sick-leave period for one employee.
///
/// Records are created by the lifecycle engine, mutated only through its
/// transition operations and never physically deleted. Day splits and
/// monetary figures are derived on demand and are not stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SickLeaveRecord {
    /// Unique identifier.
    pub id: Uuid,
    /// Human-readable number, e.g. `INC-2024-0001`.
    pub record_number: String,
    /// The employee on leave.
    pub employee_id: String,
    /// The leave request that was converted into this record, if any.
    #[serde(default)]
    pub leave_request_origin_id: Option<String>,
    /// The record this one extends. Forms the extension chain.
    #[serde(default)]
    pub previous_sick_leave_id: Option<Uuid>,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Date the certificate was issued.
    pub issue_date: NaiveDate,
    /// ICD-10 diagnosis code.
    #[serde(default)]
    pub diagnosis_code: Option<String>,
    /// Free-text diagnosis.
    pub diagnosis_description: String,
    /// Cause of the leave.
    pub illness_type: IllnessType,
    /// Doctor or clinic that issued the certificate.
    pub issuing_entity: String,
    /// EPS/ARL expected to reimburse, when known.
    #[serde(default)]
    pub paying_entity: Option<String>,
    /// Current lifecycle status.
    pub status: SickLeaveStatus,
    /// Set by transcription.
    #[serde(default)]
    pub transcription_date: Option<NaiveDate>,
    /// Filing number assigned by the paying entity.
    #[serde(default)]
    pub file_number: Option<String>,
    /// Set by collection.
    #[serde(default)]
    pub collection_date: Option<NaiveDate>,
    /// Set by collection.
    #[serde(default)]
    pub amount_paid: Option<Decimal>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Opaque references to stored documents.
    #[serde(default)]
    pub document_paths: Vec<String>,
    /// The actor who registered the record.
    pub created_by: String,
    /// When the record was registered.
    pub created_at: DateTime<Utc>,
    /// Bumped by the repository on every committed update.
    #[serde(default)]
    pub revision: u64,
}

impl SickLeaveRecord {
    /// Inclusive number of calendar days covered by the record.
    pub fn total_days(&self) -> u32 {
        inclusive_days(self.start_date, self.end_date)
    }

    /// Returns true if the record continues an earlier one.
    pub fn is_extension(&self) -> bool {
        self.previous_sick_leave_id.is_some()
    }
}

/// Inclusive calendar-day count between two dates, 0 if `end < start`.
///
/// # Examples
///
/// ```
/// use sick_leave_engine::models::inclusive_days;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
/// assert_eq!(inclusive_days(start, end), 4);
/// ```
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> u32 {
    let days = (end - start).num_days() + 1;
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}

/// Input for registering a new sick-leave record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSickLeave {
    /// The employee on leave.
    pub employee_id: String,
    /// The leave request being converted, if any.
    #[serde(default)]
    pub leave_request_origin_id: Option<String>,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Date the certificate was issued.
    pub issue_date: NaiveDate,
    /// ICD-10 diagnosis code.
    #[serde(default)]
    pub diagnosis_code: Option<String>,
    /// Free-text diagnosis.
    pub diagnosis_description: String,
    /// Cause of the leave.
    pub illness_type: IllnessType,
    /// Doctor or clinic that issued the certificate.
    pub issuing_entity: String,
    /// EPS/ARL expected to reimburse.
    #[serde(default)]
    pub paying_entity: Option<String>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Opaque references to stored documents.
    #[serde(default)]
    pub document_paths: Vec<String>,
}

/// Input for extending an existing record.
///
/// Employee, illness type and paying entity are inherited from the predecessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExtension {
    /// First day of the extension; must be the day after the predecessor ends.
    pub start_date: NaiveDate,
    /// Last day of the extension (inclusive).
    pub end_date: NaiveDate,
    /// Date the extension certificate was issued.
    pub issue_date: NaiveDate,
    /// ICD-10 diagnosis code.
    #[serde(default)]
    pub diagnosis_code: Option<String>,
    /// Free-text diagnosis.
    pub diagnosis_description: String,
    /// Doctor or clinic that issued the certificate.
    pub issuing_entity: String,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Opaque references to stored documents.
    #[serde(default)]
    pub document_paths: Vec<String>,
}
