//! Derived calculation models.
//!
//! This module contains the [`DerivedFigures`] type and its associated
//! structures: the payer, the band slices a record was cut into, and the
//! audit steps explaining every calculator decision. None of these are
//! persisted; they are recomputed from stored records whenever needed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Who bears the cost of a span of sick-leave days.
///
/// # Example
///
/// ```
/// use sick_leave_engine::models::Payer;
///
/// assert_eq!(Payer::Arl.code(), "ARL");
/// assert_eq!(serde_json::to_string(&Payer::Company).unwrap(), "\"COMPANY\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Payer {
    /// The employer.
    Company,
    /// Health-insurance entity.
    Eps,
    /// Occupational-risk insurance entity.
    Arl,
}

impl Payer {
    /// Short uppercase code, also used as the fallback paying-entity name.
    pub fn code(self) -> &'static str {
        match self {
            Payer::Company => "COMPANY",
            Payer::Eps => "EPS",
            Payer::Arl => "ARL",
        }
    }
}

/// A contiguous run of days of one record that falls inside a single band.
///
/// Day numbers are cumulative positions within the illness episode, so the
/// first day of an extension following a 10-day root is day 11.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandSlice {
    /// First cumulative day of the slice (1-based, inclusive).
    pub from_day: u32,
    /// Last cumulative day of the slice (inclusive).
    pub to_day: u32,
    /// Number of days in the slice.
    pub days: u32,
    /// Percentage of the base daily value paid for these days.
    pub percentage: Decimal,
    /// Who pays these days.
    pub payer: Payer,
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationStep {
    /// The sequential step number.
    pub step_number: u32,
    /// Stable identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// Whether monetary figures could be computed for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationStatus {
    /// A base daily value was available.
    Valued,
    /// No salary was available; monetary outputs are unset.
    Unvalued,
}

/// Everything derived for one record: chain context, day split and money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedFigures {
    /// Inclusive calendar days of the record itself.
    pub total_days: u32,
    /// Days paid by the employer.
    pub company_days: u32,
    /// Days paid by the EPS/ARL.
    pub insurer_days: u32,
    /// Day-weighted percentage over insurer days (0 if there are none).
    pub payment_percentage: Decimal,
    /// Who pays the insurer days, or `Company` if there are none.
    pub payer: Payer,
    /// Base daily pay, when a salary was available.
    pub base_day_value: Option<Decimal>,
    /// Amount to claim from the insurer, when valued.
    pub total_to_collect: Option<Decimal>,
    /// Whether the monetary figures are set.
    pub valuation_status: ValuationStatus,
    /// True if the record continues an earlier one.
    pub is_extension: bool,
    /// Days of all ancestors in the episode.
    pub prior_cumulative_days: u32,
    /// Days of the episode up to and including this record.
    pub total_accumulated_days: u32,
    /// Band slices the record was cut into.
    pub slices: Vec<BandSlice>,
    /// Ordered calculation steps.
    pub audit_trace: Vec<CalculationStep>,
}
