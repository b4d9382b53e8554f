//! Results returned by lifecycle operations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::ChainResolution;
use crate::models::{DerivedFigures, SickLeaveRecord, TrackingEntry};

use super::transitions::LifecycleAction;

/// A newly registered record together with its derived figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredSickLeave {
    /// The stored record.
    pub record: SickLeaveRecord,
    /// Figures derived at registration time.
    pub figures: DerivedFigures,
}

/// Raised when the amount collected differs from the computed amount by
/// more than the configured tolerance. It never blocks the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountMismatchWarning {
    /// The collected record.
    pub record_id: Uuid,
    /// The computed `total_to_collect`.
    pub expected: Decimal,
    /// The amount actually paid.
    pub paid: Decimal,
    /// `paid - expected`.
    pub difference: Decimal,
    /// The tolerance that was exceeded.
    pub tolerance: Decimal,
}

/// Result of a successful collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionOutcome {
    /// The record, now `Collected`.
    pub record: SickLeaveRecord,
    /// Set when the amount paid does not match the computed amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<AmountMismatchWarning>,
}

/// Everything known about one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SickLeaveDetail {
    /// The record.
    pub record: SickLeaveRecord,
    /// Its position in the illness episode.
    pub chain: ChainResolution,
    /// Derived figures with their audit trace.
    pub figures: DerivedFigures,
    /// Records extending this one, nearest first.
    pub extensions: Vec<SickLeaveRecord>,
    /// Tracking log, oldest first.
    pub tracking: Vec<TrackingEntry>,
    /// Status changes currently allowed.
    pub allowed_actions: Vec<LifecycleAction>,
}
