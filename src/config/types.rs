//! Configuration types for sick-leave cost allocation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Metadata about the cost-allocation policy.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyMetadata {
    /// Short policy code (e.g., "CO-INC").
    pub code: String,
    /// The human-readable name of the policy.
    pub name: String,
    /// The version or effective date of the policy.
    pub version: String,
    /// URL to the legal source the schedule was taken from.
    pub source_url: String,
}

/// Engine settings from settings.yaml.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineSettings {
    /// Largest accepted difference between the amount collected and the
    /// amount computed before a mismatch warning is raised.
    #[serde(default = "default_amount_tolerance")]
    pub amount_tolerance: Decimal,
    /// Days ahead of the as-of date in which an active leave "expires soon".
    #[serde(default = "default_expiry_window_days")]
    pub expiry_window_days: u32,
    /// Divisor that turns a monthly salary into the base daily value.
    #[serde(default = "default_salary_days_per_month")]
    pub salary_days_per_month: u32,
}

fn default_amount_tolerance() -> Decimal {
    Decimal::ONE
}

fn default_expiry_window_days() -> u32 {
    3
}

fn default_salary_days_per_month() -> u32 {
    30
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            amount_tolerance: default_amount_tolerance(),
            expiry_window_days: default_expiry_window_days(),
            salary_days_per_month: default_salary_days_per_month(),
        }
    }
}

/// A range of cumulative episode days paid at one percentage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PayBand {
    /// First cumulative day of the band (inclusive).
    pub from_day: u32,
    /// Last cumulative day of the band (inclusive).
    pub to_day: u32,
    /// Percentage of the base daily value paid by the EPS.
    pub percentage: Decimal,
}

/// Rules for general illness.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneralIllnessRules {
    /// Leading cumulative days paid in full by the employer.
    pub company_days: u32,
    /// EPS bands, ascending and contiguous after `company_days`.
    pub bands: Vec<PayBand>,
}

/// A single percentage applied to every day.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FlatRule {
    /// Percentage of the base daily value paid by the insurer.
    pub percentage: Decimal,
}

/// The band schedule in effect from a given date.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BandSchedule {
    /// The date from which this schedule applies.
    pub effective_date: NaiveDate,
    /// General illness rules.
    pub general_illness: GeneralIllnessRules,
    /// Work accident and occupational disease rule (paid by the ARL).
    pub work_related: FlatRule,
    /// Maternity and paternity leave rule (paid by the EPS).
    pub maternity_paternity: FlatRule,
}

impl BandSchedule {
    /// The statutory schedule: 2 employer days, 66.67% for days 3-90 and 50%
    /// for days 91-180, 100% for work-related and parental leave.
    ///
    /// # Example
    ///
    /// ```
    /// use sick_leave_engine::config::BandSchedule;
    /// use chrono::NaiveDate;
    ///
    /// let schedule = BandSchedule::statutory(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    /// assert_eq!(schedule.general_illness.company_days, 2);
    /// assert!(schedule.validate().is_ok());
    /// ```
    pub fn statutory(effective_date: NaiveDate) -> Self {
        Self {
            effective_date,
            general_illness: GeneralIllnessRules {
                company_days: 2,
                bands: vec![
                    PayBand {
                        from_day: 3,
                        to_day: 90,
                        percentage: Decimal::new(6667, 2),
                    },
                    PayBand {
                        from_day: 91,
                        to_day: 180,
                        percentage: Decimal::new(50, 0),
                    },
                ],
            },
            work_related: FlatRule {
                percentage: Decimal::ONE_HUNDRED,
            },
            maternity_paternity: FlatRule {
                percentage: Decimal::ONE_HUNDRED,
            },
        }
    }

    /// Checks that the bands start right after the employer days, are
    /// contiguous and ascending, and that every percentage is within 0-100.
    pub fn validate(&self) -> Result<(), String> {
        let rules = &self.general_illness;
        if rules.bands.is_empty() {
            return Err("general_illness.bands must not be empty".to_string());
        }

        let mut expected_from = rules.company_days + 1;
        for (index, band) in rules.bands.iter().enumerate() {
            if band.from_day != expected_from {
                return Err(format!(
                    "band {} starts on day {}, expected day {}",
                    index, band.from_day, expected_from
                ));
            }
            if band.to_day < band.from_day {
                return Err(format!(
                    "band {} ends on day {} before it starts on day {}",
                    index, band.to_day, band.from_day
                ));
            }
            check_percentage(&format!("band {}", index), band.percentage)?;
            expected_from = band.to_day + 1;
        }

        check_percentage("work_related", self.work_related.percentage)?;
        check_percentage("maternity_paternity", self.maternity_paternity.percentage)
    }
}

fn check_percentage(label: &str, percentage: Decimal) -> Result<(), String> {
    if percentage < Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
        return Err(format!(
            "{} percentage {} is outside 0-100",
            label, percentage
        ));
    }
    Ok(())
}

/// The complete policy configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    metadata: PolicyMetadata,
    settings: EngineSettings,
    /// Schedules sorted oldest first.
    schedules: Vec<BandSchedule>,
}

impl PolicyConfig {
    /// Creates a new PolicyConfig from its component parts.
    pub fn new(
        metadata: PolicyMetadata,
        settings: EngineSettings,
        schedules: Vec<BandSchedule>,
    ) -> Self {
        let mut sorted_schedules = schedules;
        sorted_schedules.sort_by(|a, b| a.effective_date.cmp(&b.effective_date));
        Self {
            metadata,
            settings,
            schedules: sorted_schedules,
        }
    }

    /// Returns the policy metadata.
    pub fn policy(&self) -> &PolicyMetadata {
        &self.metadata
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns all schedules, oldest first.
    pub fn schedules(&self) -> &[BandSchedule] {
        &self.schedules
    }
}
