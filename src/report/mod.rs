//! Read-only projections over persisted records.
//!
//! The reimbursement report and the dashboard summary are pure functions of
//! records whose figures have already been derived. They never mutate
//! anything and can run concurrently with each other and with lifecycle
//! writes.

mod dashboard;
mod reimbursement;

use chrono::{Months, NaiveDate};

use crate::error::{EngineError, EngineResult};
use crate::models::{DerivedFigures, SickLeaveRecord};

pub use dashboard::{leave_summary, summarize_dashboard};
pub use reimbursement::aggregate_reimbursement;

/// A record paired with the figures derived for it.
#[derive(Debug, Clone)]
pub struct EvaluatedRecord {
    /// The stored record.
    pub record: SickLeaveRecord,
    /// Its derived figures.
    pub figures: DerivedFigures,
}

/// First and last day of a calendar month.
///
/// # Errors
///
/// Returns a `Validation` error for a month outside 1-12 or an
/// unrepresentable year.
///
/// # Examples
///
/// ```
/// use sick_leave_engine::report::month_bounds;
/// use chrono::NaiveDate;
///
/// let (first, last) = month_bounds(2024, 2).unwrap();
/// assert_eq!(first, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
/// assert_eq!(last, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
/// ```
pub fn month_bounds(year: i32, month: u32) -> EngineResult<(NaiveDate, NaiveDate)> {
    if !(1..=12).contains(&month) {
        return Err(EngineError::validation("month", "must be between 1 and 12"));
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| EngineError::validation("year", format!("{} is out of range", year)))?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| EngineError::validation("year", format!("{} is out of range", year)))?;
    Ok((first, last))
}
