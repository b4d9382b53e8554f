//! Dashboard summary.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::calculation::{days_remaining, expires_soon, illness_type_label, status_label};
use crate::error::EngineResult;
use crate::models::{DashboardSummary, LeaveSummary, SickLeaveRecord, SickLeaveStatus};

use super::{EvaluatedRecord, month_bounds};

/// Builds the compact listing row for a record as of a date.
pub fn leave_summary(record: &SickLeaveRecord, as_of: NaiveDate, window_days: u32) -> LeaveSummary {
    LeaveSummary {
        id: record.id,
        record_number: record.record_number.clone(),
        employee_id: record.employee_id.clone(),
        start_date: record.start_date,
        end_date: record.end_date,
        total_days: record.total_days(),
        days_remaining: days_remaining(record.end_date, as_of),
        illness_type: record.illness_type,
        illness_type_label: illness_type_label(record.illness_type).to_string(),
        status: record.status,
        status_label: status_label(record.status).to_string(),
        is_extension: record.is_extension(),
        expires_soon: record.status == SickLeaveStatus::Active
            && expires_soon(record.end_date, as_of, window_days),
        paying_entity: record.paying_entity.clone(),
    }
}

/// Summarizes records for the dashboard as of a date.
///
/// "This month" is the calendar month containing `as_of`. Cancelled records
/// never count.
pub fn summarize_dashboard(
    as_of: NaiveDate,
    records: &[EvaluatedRecord],
    window_days: u32,
) -> EngineResult<DashboardSummary> {
    let (first, last) = month_bounds(as_of.year(), as_of.month())?;
    let in_month = |date: NaiveDate| date >= first && date <= last;

    let mut summary = DashboardSummary {
        as_of,
        active: 0,
        pending_transcription: 0,
        pending_collection: 0,
        finalized_this_month: 0,
        pending_collection_amount: Decimal::ZERO,
        collected_this_month_amount: Decimal::ZERO,
        sick_days_this_month: 0,
        upcoming_expiry: Vec::new(),
    };

    for EvaluatedRecord { record, figures } in records {
        if record.status == SickLeaveStatus::Cancelled {
            continue;
        }
        if in_month(record.start_date) {
            summary.sick_days_this_month += figures.total_days;
        }

        match record.status {
            SickLeaveStatus::Active => {
                summary.active += 1;
                summary.pending_transcription += 1;
                if expires_soon(record.end_date, as_of, window_days) {
                    summary
                        .upcoming_expiry
                        .push(leave_summary(record, as_of, window_days));
                }
            }
            SickLeaveStatus::Transcribed => {
                summary.pending_collection += 1;
                summary.pending_collection_amount +=
                    figures.total_to_collect.unwrap_or(Decimal::ZERO);
            }
            SickLeaveStatus::Collected => {
                if record.collection_date.is_some_and(in_month) {
                    summary.finalized_this_month += 1;
                    summary.collected_this_month_amount +=
                        record.amount_paid.unwrap_or(Decimal::ZERO);
                }
            }
            SickLeaveStatus::Cancelled => {}
        }
    }

    summary.upcoming_expiry.sort_by(|a, b| {
        a.end_date
            .cmp(&b.end_date)
            .then_with(|| a.record_number.cmp(&b.record_number))
    });

    Ok(summary)
}
