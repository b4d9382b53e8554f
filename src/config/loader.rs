//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the sick-leave
//! policy from YAML files.

use chrono::NaiveDate;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{BandSchedule, EngineSettings, PolicyConfig, PolicyMetadata};

/// Loads and provides access to the sick-leave policy.
///
/// # Directory Structure
///
/// ```text
/// config/co_sick_leave/
/// ├── policy.yaml          # Policy metadata
/// ├── settings.yaml        # Tolerance, expiry window, salary divisor
/// └── schedules/
///     └── 1990-01-01.yaml  # Band schedule effective from this date
/// ```
///
/// # Example
///
/// ```no_run
/// use sick_leave_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/co_sick_leave").unwrap();
/// let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let schedule = loader.schedule_for(date).unwrap();
/// println!("Employer days: {}", schedule.general_illness.company_days);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PolicyConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `policy.yaml` or the `schedules` directory is missing
    /// - Any file contains invalid YAML
    /// - Any schedule fails band validation
    ///
    /// `settings.yaml` is optional; defaults apply when it is absent.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<PolicyMetadata>(&path.join("policy.yaml"))?;

        let settings_path = path.join("settings.yaml");
        let settings = if settings_path.exists() {
            Self::load_yaml::<EngineSettings>(&settings_path)?
        } else {
            EngineSettings::default()
        };

        let schedules = Self::load_schedules(&path.join("schedules"))?;

        Ok(Self {
            config: PolicyConfig::new(metadata, settings, schedules),
        })
    }

    /// Builds a loader around the statutory schedule without touching disk.
    pub fn statutory() -> Self {
        let metadata = PolicyMetadata {
            code: "CO-INC".to_string(),
            name: "Statutory sick-leave cost allocation".to_string(),
            version: "builtin".to_string(),
            source_url: "https://www.secretariasenado.gov.co".to_string(),
        };
        // Far enough back to cover any record the engine will see.
        let effective = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or(NaiveDate::MIN);
        Self::from_config(PolicyConfig::new(
            metadata,
            EngineSettings::default(),
            vec![BandSchedule::statutory(effective)],
        ))
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads and validates all schedule files from the schedules directory.
    fn load_schedules(schedules_dir: &Path) -> EngineResult<Vec<BandSchedule>> {
        let dir_str = schedules_dir.display().to_string();

        if !schedules_dir.exists() {
            return Err(EngineError::ConfigNotFound { path: dir_str });
        }

        let entries = fs::read_dir(schedules_dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut schedules = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                let schedule = Self::load_yaml::<BandSchedule>(&path)?;
                schedule
                    .validate()
                    .map_err(|message| EngineError::ConfigParseError {
                        path: path.display().to_string(),
                        message,
                    })?;
                schedules.push(schedule);
            }
        }

        if schedules.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no schedule files found)", dir_str),
            });
        }

        Ok(schedules)
    }

    /// Returns the underlying policy configuration.
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Returns the policy metadata.
    pub fn policy(&self) -> &PolicyMetadata {
        self.config.policy()
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        self.config.settings()
    }

    /// Gets the band schedule in effect on a given date.
    ///
    /// The most recent schedule effective on or before `date` wins.
    pub fn schedule_for(&self, date: NaiveDate) -> EngineResult<&BandSchedule> {
        self.config
            .schedules()
            .iter()
            .rev()
            .find(|schedule| schedule.effective_date <= date)
            .ok_or(EngineError::ScheduleNotFound { date })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/co_sick_leave"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.policy().code, "CO-INC");
    }

    #[test]
    fn test_settings_loaded_correctly() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        assert_eq!(loader.settings().amount_tolerance, dec("1.00"));
        assert_eq!(loader.settings().expiry_window_days, 3);
        assert_eq!(loader.settings().salary_days_per_month, 30);
    }

    #[test]
    fn test_schedule_bands_loaded_correctly() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let schedule = loader.schedule_for(date(2024, 6, 1)).unwrap();

        assert_eq!(schedule.general_illness.company_days, 2);
        assert_eq!(schedule.general_illness.bands.len(), 2);
        assert_eq!(schedule.general_illness.bands[0].percentage, dec("66.67"));
        assert_eq!(schedule.general_illness.bands[1].to_day, 180);
        assert_eq!(schedule.work_related.percentage, dec("100"));
    }

    #[test]
    fn test_file_schedule_matches_statutory_schedule() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let schedule = loader.schedule_for(date(2024, 6, 1)).unwrap();
        let statutory = BandSchedule::statutory(schedule.effective_date);

        assert_eq!(schedule, &statutory);
    }

    #[test]
    fn test_schedule_not_found_before_first_effective_date() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        match loader.schedule_for(date(1989, 12, 31)) {
            Err(EngineError::ScheduleNotFound { date: d }) => assert_eq!(d, date(1989, 12, 31)),
            other => panic!("Expected ScheduleNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_file_schedule_covers_dates_before_2024() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        for day in [date(2023, 12, 30), date(2015, 6, 1), date(1990, 1, 1)] {
            let schedule = loader.schedule_for(day).unwrap();
            assert_eq!(schedule.effective_date, date(1990, 1, 1));
        }
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        match ConfigLoader::load("/nonexistent/path") {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("policy.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }

    #[test]
    fn test_statutory_loader_covers_recent_dates() {
        let loader = ConfigLoader::statutory();
        let schedule = loader.schedule_for(date(2024, 1, 1)).unwrap();

        assert_eq!(schedule.general_illness.company_days, 2);
        assert_eq!(loader.settings().amount_tolerance, Decimal::ONE);
    }
}
