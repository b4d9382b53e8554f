//! Derived figures for a single record.
//!
//! Combines chain resolution, the day split and valuation into the
//! [`DerivedFigures`] shown to users and summed into reports.

use uuid::Uuid;

use crate::config::ConfigLoader;
use crate::error::EngineResult;
use crate::models::{DerivedFigures, SickLeaveRecord};
use crate::storage::SalaryDirectory;

use super::chain::{ChainResolution, resolve_chain};
use super::day_split::calculate_day_split;
use super::valuation::{base_day_value_from_monthly, value_split};

/// A record's chain context together with its derived figures.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Where the record sits in its episode.
    pub chain: ChainResolution,
    /// Day split, money and audit trace.
    pub figures: DerivedFigures,
}

/// Derives all figures for a record.
///
/// The band schedule is the one in effect on the episode root's start date,
/// so every record of an episode is cut against the same table. The salary
/// is the one in effect on the record's own start date.
///
/// # Errors
///
/// Propagates chain errors (`ChainCycle`, `RecordNotFound`),
/// `ScheduleNotFound`, and `Validation` for records with no days.
pub fn evaluate_record<F, S>(
    record: &SickLeaveRecord,
    lookup: F,
    config: &ConfigLoader,
    salaries: &S,
) -> EngineResult<Evaluation>
where
    F: FnMut(Uuid) -> EngineResult<Option<SickLeaveRecord>>,
    S: SalaryDirectory + ?Sized,
{
    let chain = resolve_chain(record, lookup)?;
    let schedule = config.schedule_for(chain.root_start_date)?;

    let split = calculate_day_split(
        record.illness_type,
        record.total_days(),
        chain.prior_cumulative_days,
        schedule,
        2,
    )?;

    let base_day_value = salaries
        .monthly_salary(&record.employee_id, record.start_date)
        .map(|salary| base_day_value_from_monthly(salary, config.settings().salary_days_per_month))
        .transpose()?;

    let valuation = value_split(&split, base_day_value, 3);

    let figures = DerivedFigures {
        total_days: record.total_days(),
        company_days: split.company_days,
        insurer_days: split.insurer_days,
        payment_percentage: split.payment_percentage,
        payer: split.payer,
        base_day_value: valuation.base_day_value,
        total_to_collect: valuation.total_to_collect,
        valuation_status: valuation.status,
        is_extension: chain.is_extension,
        prior_cumulative_days: chain.prior_cumulative_days,
        total_accumulated_days: chain.total_accumulated_days,
        slices: split.slices,
        audit_trace: vec![chain.audit_step(1), split.audit_step, valuation.audit_step],
    };

    Ok(Evaluation { chain, figures })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::RecordArena;
    use crate::calculation::tests::{create_test_chain, date};
    use crate::models::{IllnessType, Payer, ValuationStatus};
    use crate::storage::InMemorySalaryDirectory;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn salaries() -> InMemorySalaryDirectory {
        InMemorySalaryDirectory::new().with_salary("emp_001", date(2020, 1, 1), dec("1500000"))
    }

    #[test]
    fn test_root_record_figures() {
        let records = create_test_chain(date(2024, 1, 1), &[5]);
        let arena = RecordArena::new(&records);
        let config = ConfigLoader::statutory();

        let evaluation =
            evaluate_record(&records[0], |id| arena.get(id), &config, &salaries()).unwrap();
        let figures = evaluation.figures;

        assert_eq!(figures.total_days, 5);
        assert_eq!(figures.company_days, 2);
        assert_eq!(figures.insurer_days, 3);
        assert_eq!(figures.payment_percentage, dec("66.67"));
        assert_eq!(figures.base_day_value, Some(dec("50000.00")));
        assert_eq!(figures.total_to_collect, Some(dec("100005.00")));
        assert!(!figures.is_extension);
        assert_eq!(figures.total_accumulated_days, 5);
        assert_eq!(figures.audit_trace.len(), 3);
        assert_eq!(figures.audit_trace[0].rule_id, "chain_resolution");
        assert_eq!(figures.audit_trace[1].rule_id, "day_split");
        assert_eq!(figures.audit_trace[2].rule_id, "valuation");
    }

    #[test]
    fn test_third_extension_uses_cumulative_offset() {
        let records = create_test_chain(date(2024, 1, 1), &[10, 10, 10]);
        let arena = RecordArena::new(&records);
        let config = ConfigLoader::statutory();

        let figures = evaluate_record(&records[2], |id| arena.get(id), &config, &salaries())
            .unwrap()
            .figures;

        assert!(figures.is_extension);
        assert_eq!(figures.prior_cumulative_days, 20);
        assert_eq!(figures.total_accumulated_days, 30);
        assert_eq!(figures.company_days, 0);
        assert_eq!(figures.insurer_days, 10);
        assert_eq!(figures.payment_percentage, dec("66.67"));
        assert_eq!(figures.payer, Payer::Eps);
    }

    #[test]
    fn test_unknown_salary_is_unvalued() {
        let mut records = create_test_chain(date(2024, 1, 1), &[10]);
        records[0].employee_id = "emp_404".to_string();
        records[0].illness_type = IllnessType::WorkAccident;
        let arena = RecordArena::new(&records);
        let config = ConfigLoader::statutory();

        let figures = evaluate_record(&records[0], |id| arena.get(id), &config, &salaries())
            .unwrap()
            .figures;

        assert_eq!(figures.valuation_status, ValuationStatus::Unvalued);
        assert_eq!(figures.insurer_days, 10);
        assert_eq!(figures.payer, Payer::Arl);
        assert!(figures.total_to_collect.is_none());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn episode_days_are_split_without_gaps(lengths in prop::collection::vec(1i64..60, 1..8)) {
                let records = create_test_chain(date(2024, 1, 1), &lengths);
                let arena = RecordArena::new(&records);
                let config = ConfigLoader::statutory();
                let salaries = salaries();

                let mut company = 0u32;
                let mut insurer = 0u32;
                let mut next_day = 1u32;
                for record in &records {
                    let figures = evaluate_record(record, |id| arena.get(id), &config, &salaries)
                        .unwrap()
                        .figures;
                    prop_assert!(figures.total_days >= 1);
                    prop_assert_eq!(figures.slices[0].from_day, next_day);
                    next_day = figures.total_accumulated_days + 1;
                    company += figures.company_days;
                    insurer += figures.insurer_days;
                }

                let episode_days: i64 = lengths.iter().sum();
                prop_assert_eq!(i64::from(company + insurer), episode_days);
                prop_assert_eq!(company, 2.min(episode_days as u32));
            }
        }
    }
}
