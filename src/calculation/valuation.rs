//! Monetary valuation of a day split.
//!
//! This module turns a [`DaySplitResult`] into the amount to claim from the
//! insurer, given the employee's base daily value.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{EngineError, EngineResult};
use crate::models::{CalculationStep, ValuationStatus};

use super::day_split::DaySplitResult;

/// Rounds a value to 2 decimal places, halves away from zero.
///
/// # Examples
///
/// ```
/// use sick_leave_engine::calculation::round_half_up;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_half_up(Decimal::new(58335, 3)), Decimal::new(5834, 2));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a monthly salary into the base daily value.
///
/// # Errors
///
/// Returns a `Validation` error if `days_per_month` is zero or the salary is
/// negative.
pub fn base_day_value_from_monthly(
    monthly_salary: Decimal,
    days_per_month: u32,
) -> EngineResult<Decimal> {
    if days_per_month == 0 {
        return Err(EngineError::validation(
            "salary_days_per_month",
            "must be greater than zero",
        ));
    }
    if monthly_salary < Decimal::ZERO {
        return Err(EngineError::validation(
            "monthly_salary",
            "must not be negative",
        ));
    }
    Ok(round_half_up(monthly_salary / Decimal::from(days_per_month)))
}

/// The monetary outcome of a day split.
#[derive(Debug, Clone)]
pub struct ValuationResult {
    /// The base daily value used, if one was available.
    pub base_day_value: Option<Decimal>,
    /// Amount to claim from the insurer, if valued.
    pub total_to_collect: Option<Decimal>,
    /// Whether the monetary figures are set.
    pub status: ValuationStatus,
    /// The audit step recording this valuation.
    pub audit_step: CalculationStep,
}

/// Values a day split.
///
/// `total_to_collect = base × insurer_days × payment_percentage / 100`, using
/// the reported (rounded) percentage, then rounded half-up to 2 decimals. A missing base daily value leaves the result `Unvalued`, which
/// is not an error.
pub fn value_split(
    split: &DaySplitResult,
    base_day_value: Option<Decimal>,
    step_number: u32,
) -> ValuationResult {
    let Some(base) = base_day_value else {
        return ValuationResult {
            base_day_value: None,
            total_to_collect: None,
            status: ValuationStatus::Unvalued,
            audit_step: CalculationStep {
                step_number,
                rule_id: "valuation".to_string(),
                rule_name: "Valuation".to_string(),
                input: serde_json::json!({
                    "insurer_days": split.insurer_days,
                    "base_day_value": null
                }),
                output: serde_json::json!({ "status": ValuationStatus::Unvalued }),
                reasoning: "No salary available; monetary figures left unset".to_string(),
            },
        };
    };

    let total = round_half_up(
        base * Decimal::from(split.insurer_days) * split.payment_percentage / Decimal::ONE_HUNDRED,
    );

    ValuationResult {
        base_day_value: Some(base),
        total_to_collect: Some(total),
        status: ValuationStatus::Valued,
        audit_step: CalculationStep {
            step_number,
            rule_id: "valuation".to_string(),
            rule_name: "Valuation".to_string(),
            input: serde_json::json!({
                "insurer_days": split.insurer_days,
                "base_day_value": base.to_string(),
                "payment_percentage": split.payment_percentage.to_string()
            }),
            output: serde_json::json!({
                "total_to_collect": total.to_string(),
                "status": ValuationStatus::Valued
            }),
            reasoning: format!(
                "${} × {} insurer day(s) at {}% = ${}",
                base, split.insurer_days, split.payment_percentage, total
            ),
        },
    }
}
