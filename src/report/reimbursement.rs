//! Reimbursement report aggregation.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{
    EntityTotal, ReimbursementReport, ReportLineItem, ReportQuery, SickLeaveStatus,
    ValuationStatus,
};

use super::{EvaluatedRecord, month_bounds};

/// Builds the reimbursement report for one issue month.
///
/// A record is included when its issue date falls in the month, it is not
/// cancelled, it has at least one insurer day, and it matches the
/// paying-entity filter (case-insensitive) when one is given. Entity
/// subtotals group names case-insensitively as well. Records without a
/// paying entity are billed under their payer code. Unvalued
/// records contribute zero and are counted in `unvalued_count`.
///
/// # Errors
///
/// Returns a `Validation` error for an invalid year or month.
pub fn aggregate_reimbursement(
    query: &ReportQuery,
    records: &[EvaluatedRecord],
) -> EngineResult<ReimbursementReport> {
    let (first, last) = month_bounds(query.year, query.month)?;
    let entity_filter = query
        .paying_entity
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());

    let mut line_items: Vec<ReportLineItem> = records
        .iter()
        .filter(|e| e.record.issue_date >= first && e.record.issue_date <= last)
        .filter(|e| e.record.status != SickLeaveStatus::Cancelled)
        .filter(|e| e.figures.insurer_days > 0)
        .map(line_item)
        .filter(|item| entity_filter.is_none_or(|f| item.paying_entity.eq_ignore_ascii_case(f)))
        .collect();

    line_items.sort_by(|a, b| {
        a.start_date
            .cmp(&b.start_date)
            .then_with(|| a.record_number.cmp(&b.record_number))
    });

    // Keyed case-insensitively, labelled with the earliest line's spelling
    let mut by_entity: BTreeMap<String, EntityTotal> = BTreeMap::new();
    for item in &line_items {
        let total = by_entity
            .entry(item.paying_entity.to_ascii_lowercase())
            .or_insert_with(|| EntityTotal {
                paying_entity: item.paying_entity.clone(),
                records: 0,
                insurer_days: 0,
                amount: Decimal::ZERO,
            });
        total.records += 1;
        total.insurer_days += item.insurer_days;
        total.amount += item.total_to_collect;
    }

    let report = ReimbursementReport {
        year: query.year,
        month: query.month,
        period: format!("{:04}-{:02}", query.year, query.month),
        paying_entity_filter: entity_filter.map(str::to_string),
        total_records: line_items.len() as u32,
        total_days: line_items.iter().map(|i| i.total_days).sum(),
        total_insurer_days: line_items.iter().map(|i| i.insurer_days).sum(),
        grand_total: line_items.iter().map(|i| i.total_to_collect).sum(),
        unvalued_count: line_items
            .iter()
            .filter(|i| i.valuation_status == ValuationStatus::Unvalued)
            .count() as u32,
        entity_totals: by_entity.into_values().collect(),
        line_items,
    };

    tracing::debug!(
        period = %report.period,
        records = report.total_records,
        grand_total = %report.grand_total,
        "reimbursement report aggregated"
    );

    Ok(report)
}

fn line_item(evaluated: &EvaluatedRecord) -> ReportLineItem {
    let record = &evaluated.record;
    let figures = &evaluated.figures;
    let paying_entity = record
        .paying_entity
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .unwrap_or(figures.payer.code())
        .to_string();

    ReportLineItem {
        record_id: record.id,
        record_number: record.record_number.clone(),
        employee_id: record.employee_id.clone(),
        start_date: record.start_date,
        end_date: record.end_date,
        issue_date: record.issue_date,
        illness_type: record.illness_type,
        status: record.status,
        paying_entity,
        payer: figures.payer,
        is_extension: figures.is_extension,
        total_days: figures.total_days,
        company_days: figures.company_days,
        insurer_days: figures.insurer_days,
        payment_percentage: figures.payment_percentage,
        base_day_value: figures.base_day_value,
        total_to_collect: figures.total_to_collect.unwrap_or(Decimal::ZERO),
        valuation_status: figures.valuation_status,
        file_number: record.file_number.clone(),
    }
}
