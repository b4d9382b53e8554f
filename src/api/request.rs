//! Request types for the sick-leave API.
//!
//! Every mutating request names the acting user in `performed_by`; the
//! engine records it on the tracking entry.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{NewExtension, NewSickLeave};

/// Body of `POST /sick-leaves`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSickLeaveRequest {
    /// The record to register.
    #[serde(flatten)]
    pub sick_leave: NewSickLeave,
    /// The acting user.
    pub performed_by: String,
}

/// Body of `POST /sick-leaves/:id/extensions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExtensionRequest {
    /// The extension to register.
    #[serde(flatten)]
    pub extension: NewExtension,
    /// The acting user.
    pub performed_by: String,
}

/// Body of `POST /sick-leaves/:id/transcription`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionRequest {
    /// Date the record was filed with the paying entity.
    pub transcription_date: NaiveDate,
    /// Filing number assigned by the paying entity.
    #[serde(default)]
    pub file_number: Option<String>,
    /// The acting user.
    pub performed_by: String,
}

/// Body of `POST /sick-leaves/:id/collection`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionRequest {
    /// Date the reimbursement was received.
    pub collection_date: NaiveDate,
    /// Amount received.
    pub amount_paid: Decimal,
    /// The acting user.
    pub performed_by: String,
}

/// Body of `POST /sick-leaves/:id/cancel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelRequest {
    /// Why the record is being voided.
    pub reason: String,
    /// The acting user.
    pub performed_by: String,
}

/// Body of `POST /sick-leaves/:id/notes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteRequest {
    /// Note text.
    pub text: String,
    /// The acting user.
    pub performed_by: String,
}

/// Body of `POST /sick-leaves/:id/documents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRequest {
    /// Opaque reference to the stored document.
    pub path: String,
    /// The acting user.
    pub performed_by: String,
}

/// Query string of `GET /dashboard`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardQuery {
    /// Date to compute the summary for; today when omitted.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}
