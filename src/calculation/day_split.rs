//! Day-split calculation functionality.
//!
//! This module splits the days of one sick-leave record between the employer
//! and the insurer, slicing the record against the cumulative day bands of the
//! illness episode it belongs to.

use rust_decimal::Decimal;

use crate::config::BandSchedule;
use crate::error::{EngineError, EngineResult};
use crate::models::{BandSlice, CalculationStep, IllnessType, Payer};

use super::valuation::round_half_up;

/// The result of splitting one record's days, including the audit step.
#[derive(Debug, Clone)]
pub struct DaySplitResult {
    /// Days paid in full by the employer.
    pub company_days: u32,
    /// Days claimed from the insurer.
    pub insurer_days: u32,
    /// Day-weighted percentage over insurer days, rounded to 2 decimals.
    pub payment_percentage: Decimal,
    /// Who pays the insurer days (`Company` if there are none).
    pub payer: Payer,
    /// One slice per band touched, in cumulative-day coordinates.
    pub slices: Vec<BandSlice>,
    /// Unrounded `Σ(days × percentage)` over insurer slices.
    pub weighted_percentage_days: Decimal,
    /// The audit step recording this split.
    pub audit_step: CalculationStep,
}

/// Splits a record's days between the employer and the insurer.
///
/// Day positions are cumulative within the episode: the record covers days
/// `prior_cumulative_days + 1 ..= prior_cumulative_days + total_days`.
///
/// - General illness: the leading `company_days` of the episode are paid by
///   the employer; the remaining days are paid by the EPS at the percentage
///   of the band they fall in. Days past the last band keep its percentage.
/// - Work accident and occupational disease: every day is paid by the ARL.
/// - Maternity and paternity leave: every day is paid by the EPS.
///
/// # Errors
///
/// Returns a `Validation` error if `total_days` is zero.
///
/// # Examples
///
/// ```
/// use sick_leave_engine::calculation::calculate_day_split;
/// use sick_leave_engine::config::BandSchedule;
/// use sick_leave_engine::models::{IllnessType, Payer};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let schedule = BandSchedule::statutory(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
/// let split = calculate_day_split(IllnessType::GeneralIllness, 5, 0, &schedule, 1).unwrap();
///
/// assert_eq!(split.company_days, 2);
/// assert_eq!(split.insurer_days, 3);
/// assert_eq!(split.payment_percentage, Decimal::new(6667, 2));
/// assert_eq!(split.payer, Payer::Eps);
/// ```
pub fn calculate_day_split(
    illness_type: IllnessType,
    total_days: u32,
    prior_cumulative_days: u32,
    schedule: &BandSchedule,
    step_number: u32,
) -> EngineResult<DaySplitResult> {
    if total_days == 0 {
        return Err(EngineError::validation(
            "total_days",
            "a sick leave must cover at least one day",
        ));
    }

    let first_day = prior_cumulative_days.saturating_add(1);
    let last_day = prior_cumulative_days.saturating_add(total_days);

    let (slices, rule) = if illness_type.is_work_related() {
        (
            vec![flat_slice(
                first_day,
                last_day,
                schedule.work_related.percentage,
                Payer::Arl,
            )],
            "work_related_flat",
        )
    } else if illness_type.is_parental_leave() {
        (
            vec![flat_slice(
                first_day,
                last_day,
                schedule.maternity_paternity.percentage,
                Payer::Eps,
            )],
            "parental_leave_flat",
        )
    } else {
        (
            general_illness_slices(first_day, last_day, schedule),
            "general_illness_bands",
        )
    };

    let company_days: u32 = slices
        .iter()
        .filter(|s| s.payer == Payer::Company)
        .map(|s| s.days)
        .sum();
    let insurer_days = total_days - company_days;

    let weighted_percentage_days: Decimal = slices
        .iter()
        .filter(|s| s.payer != Payer::Company)
        .map(|s| Decimal::from(s.days) * s.percentage)
        .sum();

    let (payment_percentage, payer) = if insurer_days == 0 {
        (Decimal::ZERO, Payer::Company)
    } else {
        let payer = slices
            .iter()
            .find(|s| s.payer != Payer::Company)
            .map_or(Payer::Company, |s| s.payer);
        (
            round_half_up(weighted_percentage_days / Decimal::from(insurer_days)),
            payer,
        )
    };

    tracing::debug!(
        ?illness_type,
        total_days,
        prior_cumulative_days,
        company_days,
        insurer_days,
        %payment_percentage,
        "day split calculated"
    );

    let audit_step = CalculationStep {
        step_number,
        rule_id: "day_split".to_string(),
        rule_name: "Day Split".to_string(),
        input: serde_json::json!({
            "illness_type": illness_type,
            "total_days": total_days,
            "prior_cumulative_days": prior_cumulative_days,
            "schedule_effective_date": schedule.effective_date.to_string(),
            "rule": rule
        }),
        output: serde_json::json!({
            "company_days": company_days,
            "insurer_days": insurer_days,
            "payment_percentage": payment_percentage.to_string(),
            "payer": payer,
            "slices": slices.len()
        }),
        reasoning: split_reasoning(first_day, last_day, company_days, &slices, payer),
    };

    Ok(DaySplitResult {
        company_days,
        insurer_days,
        payment_percentage,
        payer,
        slices,
        weighted_percentage_days,
        audit_step,
    })
}

fn flat_slice(first_day: u32, last_day: u32, percentage: Decimal, payer: Payer) -> BandSlice {
    BandSlice {
        from_day: first_day,
        to_day: last_day,
        days: last_day - first_day + 1,
        percentage,
        payer,
    }
}

/// Cuts `[first_day, last_day]` against the employer days and the EPS bands.
fn general_illness_slices(first_day: u32, last_day: u32, schedule: &BandSchedule) -> Vec<BandSlice> {
    let rules = &schedule.general_illness;
    let mut slices = Vec::new();

    if rules.company_days > 0 {
        if let Some((from, to)) = overlap(first_day, last_day, 1, rules.company_days) {
            slices.push(flat_slice(from, to, Decimal::ONE_HUNDRED, Payer::Company));
        }
    }

    let last_index = rules.bands.len().saturating_sub(1);
    for (index, band) in rules.bands.iter().enumerate() {
        let band_end = if index == last_index {
            u32::MAX
        } else {
            band.to_day
        };
        if let Some((from, to)) = overlap(first_day, last_day, band.from_day, band_end) {
            slices.push(flat_slice(from, to, band.percentage, Payer::Eps));
        }
    }

    slices
}

fn overlap(a_from: u32, a_to: u32, b_from: u32, b_to: u32) -> Option<(u32, u32)> {
    let from = a_from.max(b_from);
    let to = a_to.min(b_to);
    (from <= to).then_some((from, to))
}

fn split_reasoning(
    first_day: u32,
    last_day: u32,
    company_days: u32,
    slices: &[BandSlice],
    payer: Payer,
) -> String {
    let parts: Vec<String> = slices
        .iter()
        .map(|s| {
            format!(
                "days {}-{} ({}) at {}% by {}",
                s.from_day,
                s.to_day,
                s.days,
                s.percentage,
                s.payer.code()
            )
        })
        .collect();
    format!(
        "Episode days {}-{}: {}; {} employer day(s), insurer days paid by {}",
        first_day,
        last_day,
        parts.join(", "),
        company_days,
        payer.code()
    )
}
