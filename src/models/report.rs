//! Reimbursement report and dashboard models.
//!
//! These are read-only projections over persisted records, consumed by the
//! report renderer and the dashboard. The engine never stores them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{IllnessType, Payer, SickLeaveStatus, ValuationStatus};

/// Selects the records of one reimbursement report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportQuery {
    /// Calendar year of the issue dates to include.
    pub year: i32,
    /// Calendar month (1-12) of the issue dates to include.
    pub month: u32,
    /// Only include records billed to this entity.
    #[serde(default)]
    pub paying_entity: Option<String>,
}

/// Work still outstanding on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingStage {
    /// Not yet filed with the paying entity (`Active`).
    Transcription,
    /// Filed and awaiting reimbursement (`Transcribed`).
    Collection,
}

impl PendingStage {
    /// The status a record waiting at this stage is in.
    pub fn status(self) -> SickLeaveStatus {
        match self {
            PendingStage::Transcription => SickLeaveStatus::Active,
            PendingStage::Collection => SickLeaveStatus::Transcribed,
        }
    }
}

/// Filters for listing records. Every field is optional and they combine
/// with AND.
///
/// `from` keeps records starting on or after the date, `to` keeps records
/// ending on or before it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SickLeaveQuery {
    /// Only this employee's records.
    #[serde(default)]
    pub employee_id: Option<String>,
    /// Only records in this status.
    #[serde(default)]
    pub status: Option<SickLeaveStatus>,
    /// Only records of this illness type.
    #[serde(default)]
    pub illness_type: Option<IllnessType>,
    /// Earliest start date.
    #[serde(default)]
    pub from: Option<NaiveDate>,
    /// Latest end date.
    #[serde(default)]
    pub to: Option<NaiveDate>,
    /// Only records waiting at this stage.
    #[serde(default)]
    pub pending: Option<PendingStage>,
}

/// One record's contribution to a reimbursement report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLineItem {
    /// The record.
    pub record_id: Uuid,
    /// Human-readable record number.
    pub record_number: String,
    /// The employee on leave.
    pub employee_id: String,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave.
    pub end_date: NaiveDate,
    /// Certificate issue date (the aggregation key).
    pub issue_date: NaiveDate,
    /// Cause of the leave.
    pub illness_type: IllnessType,
    /// Current status of the record.
    pub status: SickLeaveStatus,
    /// Entity the amount is claimed from.
    pub paying_entity: String,
    /// Kind of payer.
    pub payer: Payer,
    /// True if the record continues an earlier one.
    pub is_extension: bool,
    /// Inclusive days of the record.
    pub total_days: u32,
    /// Days paid by the employer.
    pub company_days: u32,
    /// Days claimed from the insurer.
    pub insurer_days: u32,
    /// Day-weighted payment percentage.
    pub payment_percentage: Decimal,
    /// Base daily pay, when known.
    pub base_day_value: Option<Decimal>,
    /// Amount to claim (zero when unvalued).
    pub total_to_collect: Decimal,
    /// Whether the amount could be computed.
    pub valuation_status: ValuationStatus,
    /// Filing number, once transcribed.
    pub file_number: Option<String>,
}

/// Subtotal for one paying entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTotal {
    /// The paying entity.
    pub paying_entity: String,
    /// Number of line items billed to the entity.
    pub records: u32,
    /// Insurer days billed to the entity.
    pub insurer_days: u32,
    /// Amount billed to the entity.
    pub amount: Decimal,
}

/// Amounts to claim from EPS/ARL entities for one issue month.
///
/// The sum of the line items' `total_to_collect` equals `grand_total`, and
/// so does the sum of `entity_totals[].amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReimbursementReport {
    /// Report year.
    pub year: i32,
    /// Report month.
    pub month: u32,
    /// `YYYY-MM` label.
    pub period: String,
    /// The paying-entity filter that was applied, if any.
    pub paying_entity_filter: Option<String>,
    /// Line items ordered by start date.
    pub line_items: Vec<ReportLineItem>,
    /// Number of line items.
    pub total_records: u32,
    /// Sum of the records' inclusive days.
    pub total_days: u32,
    /// Sum of insurer days.
    pub total_insurer_days: u32,
    /// Sum of amounts to claim.
    pub grand_total: Decimal,
    /// Line items that could not be valued.
    pub unvalued_count: u32,
    /// Subtotals by paying entity, ordered by entity name.
    pub entity_totals: Vec<EntityTotal>,
}

/// Compact listing row used by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveSummary {
    /// The record.
    pub id: Uuid,
    /// Human-readable record number.
    pub record_number: String,
    /// The employee on leave.
    pub employee_id: String,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave.
    pub end_date: NaiveDate,
    /// Inclusive days.
    pub total_days: u32,
    /// Days left until the leave ends, never negative.
    pub days_remaining: u32,
    /// Cause of the leave.
    pub illness_type: IllnessType,
    /// Display label for the cause.
    pub illness_type_label: String,
    /// Current status.
    pub status: SickLeaveStatus,
    /// Display label for the status.
    pub status_label: String,
    /// True if the record continues an earlier one.
    pub is_extension: bool,
    /// True if the leave ends within the expiry window.
    pub expires_soon: bool,
    /// Entity billed, when known.
    pub paying_entity: Option<String>,
}

/// Read-only counts and lists for the HR dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// The date the summary was computed for.
    pub as_of: NaiveDate,
    /// Records in `Active`.
    pub active: u32,
    /// Records still waiting to be transcribed.
    pub pending_transcription: u32,
    /// Transcribed records waiting for reimbursement.
    pub pending_collection: u32,
    /// Records collected during the as-of month.
    pub finalized_this_month: u32,
    /// Valued amount still to be collected from transcribed records.
    pub pending_collection_amount: Decimal,
    /// Amount actually collected during the as-of month.
    pub collected_this_month_amount: Decimal,
    /// Days of leave starting in the as-of month (cancelled records excluded).
    pub sick_days_this_month: u32,
    /// Active records ending within the expiry window, soonest first.
    pub upcoming_expiry: Vec<LeaveSummary>,
}
