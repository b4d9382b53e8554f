//! Employee salary directory.
//!
//! The engine only needs one figure from the employee directory: the monthly
//! salary in effect on a date. A missing salary is not an error; the record
//! is reported as unvalued instead.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};

/// Supplies monthly salaries per employee.
pub trait SalaryDirectory: Send + Sync {
    /// The monthly salary of `employee_id` in effect on `as_of`, if known.
    fn monthly_salary(&self, employee_id: &str, as_of: NaiveDate) -> Option<Decimal>;
}

/// A salary that applies from a date onwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SalaryEntry {
    /// The employee.
    pub employee_id: String,
    /// First day the salary applies.
    pub effective_date: NaiveDate,
    /// Monthly salary.
    pub monthly_salary: Decimal,
}

/// Salary directory backed by dated entries held in memory.
///
/// # Example
///
/// ```
/// use sick_leave_engine::storage::{InMemorySalaryDirectory, SalaryDirectory};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let directory = InMemorySalaryDirectory::new().with_salary(
///     "emp_001",
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     Decimal::new(1_500_000, 0),
/// );
///
/// let on = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
/// assert_eq!(directory.monthly_salary("emp_001", on), Some(Decimal::new(1_500_000, 0)));
/// assert_eq!(directory.monthly_salary("emp_999", on), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemorySalaryDirectory {
    /// Entries per employee, sorted by effective date.
    entries: HashMap<String, Vec<SalaryEntry>>,
}

impl InMemorySalaryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a salary entry.
    pub fn insert(&mut self, entry: SalaryEntry) {
        let entries = self.entries.entry(entry.employee_id.clone()).or_default();
        entries.push(entry);
        entries.sort_by(|a, b| a.effective_date.cmp(&b.effective_date));
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_salary(
        mut self,
        employee_id: &str,
        effective_date: NaiveDate,
        monthly_salary: Decimal,
    ) -> Self {
        self.insert(SalaryEntry {
            employee_id: employee_id.to_string(),
            effective_date,
            monthly_salary,
        });
        self
    }

    /// Loads a YAML list of salary entries.
    ///
    /// ```yaml
    /// - employee_id: emp_001
    ///   effective_date: 2024-01-01
    ///   monthly_salary: "1500000"
    /// ```
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path_str = path.as_ref().display().to_string();
        let content = fs::read_to_string(path.as_ref()).map_err(|_| {
            EngineError::ConfigNotFound {
                path: path_str.clone(),
            }
        })?;
        let entries: Vec<SalaryEntry> =
            serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
                path: path_str,
                message: e.to_string(),
            })?;

        let mut directory = Self::new();
        for entry in entries {
            directory.insert(entry);
        }
        Ok(directory)
    }
}

impl SalaryDirectory for InMemorySalaryDirectory {
    fn monthly_salary(&self, employee_id: &str, as_of: NaiveDate) -> Option<Decimal> {
        self.entries
            .get(employee_id)?
            .iter()
            .rev()
            .find(|entry| entry.effective_date <= as_of)
            .map(|entry| entry.monthly_salary)
    }
}
