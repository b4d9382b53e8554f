//! Extension chain resolution.
//!
//! Extensions link back to their predecessor through
//! `previous_sick_leave_id`. This module walks those links by id, through a
//! caller-supplied lookup, with a visited-set guard so malformed chains fail
//! instead of looping.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{CalculationStep, SickLeaveRecord};

/// One ancestor of a resolved record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLink {
    /// The ancestor.
    pub id: Uuid,
    /// Its record number.
    pub record_number: String,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave.
    pub end_date: NaiveDate,
    /// Inclusive days of the ancestor.
    pub total_days: u32,
}

/// The position of a record within its illness episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainResolution {
    /// The record that was resolved.
    pub record_id: Uuid,
    /// The episode root (the record itself if it is not an extension).
    pub root_id: Uuid,
    /// Start date of the episode root.
    pub root_start_date: NaiveDate,
    /// Ancestors, nearest first.
    pub ancestors: Vec<ChainLink>,
    /// Sum of the ancestors' days.
    pub prior_cumulative_days: u32,
    /// Days of the episode up to and including the record.
    pub total_accumulated_days: u32,
    /// True if the record continues an earlier one.
    pub is_extension: bool,
}

impl ChainResolution {
    /// Builds the audit step describing this resolution.
    pub fn audit_step(&self, step_number: u32) -> CalculationStep {
        CalculationStep {
            step_number,
            rule_id: "chain_resolution".to_string(),
            rule_name: "Extension Chain Resolution".to_string(),
            input: serde_json::json!({
                "record_id": self.record_id,
            }),
            output: serde_json::json!({
                "root_id": self.root_id,
                "root_start_date": self.root_start_date.to_string(),
                "ancestors": self.ancestors.len(),
                "prior_cumulative_days": self.prior_cumulative_days,
                "total_accumulated_days": self.total_accumulated_days,
                "is_extension": self.is_extension
            }),
            reasoning: if self.is_extension {
                format!(
                    "Extension with {} ancestor(s) totalling {} day(s); episode reaches day {}",
                    self.ancestors.len(),
                    self.prior_cumulative_days,
                    self.total_accumulated_days
                )
            } else {
                format!(
                    "Root record; episode reaches day {}",
                    self.total_accumulated_days
                )
            },
        }
    }
}

/// Walks a record's `previous_sick_leave_id` links back to the episode root.
///
/// Runs in O(chain depth) lookups.
///
/// # Errors
///
/// - `ChainCycle` if an id recurs before a root is reached
/// - `RecordNotFound` if a linked ancestor does not exist
/// - Any error returned by `lookup`
pub fn resolve_chain<F>(record: &SickLeaveRecord, mut lookup: F) -> EngineResult<ChainResolution>
where
    F: FnMut(Uuid) -> EngineResult<Option<SickLeaveRecord>>,
{
    let mut visited = HashSet::from([record.id]);
    let mut ancestors = Vec::new();
    let mut prior_cumulative_days: u32 = 0;
    let mut root_id = record.id;
    let mut root_start_date = record.start_date;
    let mut next = record.previous_sick_leave_id;

    while let Some(id) = next {
        if !visited.insert(id) {
            return Err(EngineError::ChainCycle {
                record_id: record.id,
                repeated_id: id,
            });
        }

        let ancestor = lookup(id)?.ok_or(EngineError::RecordNotFound { id })?;
        let total_days = ancestor.total_days();
        prior_cumulative_days = prior_cumulative_days.saturating_add(total_days);
        root_id = ancestor.id;
        root_start_date = ancestor.start_date;
        next = ancestor.previous_sick_leave_id;

        ancestors.push(ChainLink {
            id: ancestor.id,
            record_number: ancestor.record_number,
            start_date: ancestor.start_date,
            end_date: ancestor.end_date,
            total_days,
        });
    }

    Ok(ChainResolution {
        record_id: record.id,
        root_id,
        root_start_date,
        ancestors,
        prior_cumulative_days,
        total_accumulated_days: prior_cumulative_days.saturating_add(record.total_days()),
        is_extension: record.is_extension(),
    })
}

/// Walks forward from a record through its direct successors.
///
/// Returns the extensions in chain order, nearest first.
///
/// # Errors
///
/// Returns `ChainCycle` if a successor recurs, or any error from `find_successor`.
pub fn collect_extensions<F>(record_id: Uuid, mut find_successor: F) -> EngineResult<Vec<SickLeaveRecord>>
where
    F: FnMut(Uuid) -> EngineResult<Option<SickLeaveRecord>>,
{
    let mut visited = HashSet::from([record_id]);
    let mut extensions = Vec::new();
    let mut current = record_id;

    while let Some(successor) = find_successor(current)? {
        if !visited.insert(successor.id) {
            return Err(EngineError::ChainCycle {
                record_id,
                repeated_id: successor.id,
            });
        }
        current = successor.id;
        extensions.push(successor);
    }

    Ok(extensions)
}

/// An id-indexed view over a set of records, for resolving chains without a
/// repository.
///
/// # Example
///
/// ```
/// use sick_leave_engine::calculation::RecordArena;
/// use sick_leave_engine::models::SickLeaveRecord;
///
/// let records: Vec<SickLeaveRecord> = Vec::new();
/// let arena = RecordArena::new(&records);
/// assert!(arena.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordArena<'a> {
    records: HashMap<Uuid, &'a SickLeaveRecord>,
    successors: HashMap<Uuid, &'a SickLeaveRecord>,
}

impl<'a> RecordArena<'a> {
    /// Indexes the given records by id and by predecessor.
    pub fn new(records: &'a [SickLeaveRecord]) -> Self {
        let mut arena = Self::default();
        for record in records {
            arena.records.insert(record.id, record);
            if let Some(previous) = record.previous_sick_leave_id {
                arena.successors.insert(previous, record);
            }
        }
        arena
    }

    /// Number of indexed records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no records are indexed.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up a record by id.
    pub fn get(&self, id: Uuid) -> EngineResult<Option<SickLeaveRecord>> {
        Ok(self.records.get(&id).map(|r| (*r).clone()))
    }

    /// Looks up the direct successor of a record.
    pub fn successor(&self, id: Uuid) -> EngineResult<Option<SickLeaveRecord>> {
        Ok(self.successors.get(&id).map(|r| (*r).clone()))
    }

    /// Resolves the chain of a record using this arena.
    pub fn resolve(&self, record: &SickLeaveRecord) -> EngineResult<ChainResolution> {
        resolve_chain(record, |id| self.get(id))
    }
}
