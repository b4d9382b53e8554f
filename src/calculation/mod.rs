//! Calculation logic for the sick-leave engine.
//!
//! This module contains the pure calculation functions: extension chain
//! resolution, the day split between employer and insurer, monetary
//! valuation, per-record derived figures, and display helpers. None of them
//! perform I/O; storage is reached only through caller-supplied lookups.

mod chain;
mod day_split;
mod display;
mod figures;
mod valuation;

pub use chain::{ChainLink, ChainResolution, RecordArena, collect_extensions, resolve_chain};
pub use day_split::{DaySplitResult, calculate_day_split};
pub use display::{
    action_label, days_remaining, expires_soon, illness_type_label, is_expired, status_label,
};
pub use figures::{Evaluation, evaluate_record};
pub use valuation::{ValuationResult, base_day_value_from_monthly, round_half_up, value_split};

#[cfg(test)]
pub(crate) use chain::tests;
